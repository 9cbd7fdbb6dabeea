use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::colour::{colours, Colour};
use crate::image::Logo;
use crate::layout::{place_lines, wrap, PlacedLine};
use crate::units::Px;

/// Where the logo sits on the canvas
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoPlacement {
    pub x: Px,
    pub y: Px,
    pub width: Px,
    pub height: Px,
}

impl Default for LogoPlacement {
    fn default() -> Self {
        LogoPlacement {
            x: Px(210.0),
            y: Px(290.0),
            width: Px(120.0),
            height: Px(50.0),
        }
    }
}

/// Everything about the canvas that does not depend on the joke itself
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasStyle {
    pub width: Px,
    pub height: Px,
    pub background: Colour,
    pub text_colour: Colour,
    pub font_family: String,
    pub font_size: Px,
    pub font_weight: String,
    /// Maximum number of characters per wrapped line
    pub max_line_length: usize,
    pub first_baseline: Px,
    pub line_height: Px,
    pub logo: LogoPlacement,
}

impl Default for CanvasStyle {
    fn default() -> Self {
        CanvasStyle {
            width: Px(350.0),
            height: Px(350.0),
            background: colours::XP_BLUE,
            text_colour: colours::WHITE,
            font_family: "Tahoma, Verdana, 'DejaVu Sans', sans-serif".to_string(),
            font_size: Px(30.0),
            font_weight: "bold".to_string(),
            max_line_length: 20,
            first_baseline: Px(120.0),
            line_height: Px(35.0),
            logo: LogoPlacement::default(),
        }
    }
}

impl CanvasStyle {
    /// The named families in `font_family`, in order, without quotes and
    /// without generic families such as `sans-serif`
    pub fn font_families(&self) -> impl Iterator<Item = &str> {
        self.font_family
            .split(',')
            .map(|family| family.trim().trim_matches(['\'', '"']))
            .filter(|family| {
                !family.is_empty()
                    && !matches!(
                        *family,
                        "serif" | "sans-serif" | "monospace" | "cursive" | "fantasy"
                    )
            })
    }
}

/// The vector canvas a joke is drawn on before being rasterised: a flat
/// background, the wrapped joke centred line by line, and a logo.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    pub style: CanvasStyle,
    pub lines: Vec<PlacedLine>,
    pub logo: Option<Logo>,
}

impl Canvas {
    /// Lay out `joke` on a fresh canvas
    pub fn for_joke(joke: &str, style: &CanvasStyle, logo: Option<Logo>) -> Canvas {
        let lines = place_lines(
            wrap(joke, style.max_line_length),
            style.first_baseline,
            style.line_height,
        );
        Canvas {
            style: style.clone(),
            lines,
            logo,
        }
    }

    /// Pixel size of the raster this canvas produces
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.style.width.whole(), self.style.height.whole())
    }

    /// Serialise the canvas as a standalone SVG document
    pub fn to_svg(&self) -> String {
        let CanvasStyle {
            width,
            height,
            background,
            text_colour,
            font_family,
            font_size,
            font_weight,
            logo: placement,
            ..
        } = &self.style;

        let mut svg = String::with_capacity(512);
        // writing into a String cannot fail
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        let _ = writeln!(
            svg,
            r#"  <rect width="{width}" height="{height}" fill="{background}"/>"#
        );

        let centre = *width / 2.0;
        for line in &self.lines {
            let _ = writeln!(
                svg,
                r#"  <text x="{centre}" y="{y}" font-family="{family}" font-size="{font_size}" font-weight="{weight}" fill="{text_colour}" text-anchor="middle">{text}</text>"#,
                y = line.baseline,
                family = escape_xml(font_family),
                weight = escape_xml(font_weight),
                text = escape_xml(&line.text),
            );
        }

        if let Some(logo) = &self.logo {
            let _ = writeln!(
                svg,
                r#"  <image xlink:href="{href}" x="{x}" y="{y}" width="{w}" height="{h}" preserveAspectRatio="xMidYMid slice"/>"#,
                href = logo.to_data_uri(),
                x = placement.x,
                y = placement.y,
                w = placement.width,
                h = placement.height,
            );
        }

        svg.push_str("</svg>\n");
        svg
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
