//! Minimal SVG writer shared by the charts.

use quick_xml::escape::escape;

/// Width of a character relative to the font size. SVG viewers pick the
/// actual font, so layouts reserve this much room per character.
pub(crate) const CHAR_WIDTH: f32 = 0.6;

/// Estimated rendered width of `text`.
pub(crate) fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * CHAR_WIDTH
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TextStyle {
    pub size: f32,
    pub fill: String,
    pub anchor: Anchor,
    pub bold: bool,
    /// Rotation in degrees around the anchor point, counterclockwise.
    pub rotation: f32,
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        TextStyle {
            size,
            fill: "#000000".to_string(),
            anchor: Anchor::Start,
            bold: false,
            rotation: 0.0,
        }
    }

    pub fn fill(mut self, fill: &str) -> Self {
        self.fill = fill.to_string();
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }
}

/// An SVG document being drawn.
pub(crate) struct SvgCanvas {
    width: f32,
    height: f32,
    body: String,
}

impl SvgCanvas {
    pub fn new(width: f32, height: f32, background: &str) -> Self {
        let mut canvas = SvgCanvas {
            width,
            height,
            body: String::new(),
        };
        canvas.rect(0.0, 0.0, width, height, background);
        canvas
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: &str) {
        self.body.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" fill=\"{}\"/>\n",
            escape(fill)
        ));
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), stroke: &str, width: f32, dashed: bool) {
        let dash = if dashed { " stroke-dasharray=\"4 3\"" } else { "" };
        self.body.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{width:.2}\"{dash}/>\n",
            from.0,
            from.1,
            to.0,
            to.1,
            escape(stroke)
        ));
    }

    pub fn circle(&mut self, center: (f32, f32), radius: f32, fill: &str) {
        self.body.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{radius:.2}\" fill=\"{}\"/>\n",
            center.0,
            center.1,
            escape(fill)
        ));
    }

    pub fn text(&mut self, x: f32, y: f32, content: &str, style: &TextStyle) {
        let weight = if style.bold { " font-weight=\"bold\"" } else { "" };
        let transform = if style.rotation != 0.0 {
            format!(" transform=\"rotate({:.1} {x:.2} {y:.2})\"", -style.rotation)
        } else {
            String::new()
        };
        self.body.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\" font-family=\"sans-serif\" font-size=\"{:.1}\" fill=\"{}\" text-anchor=\"{}\"{weight}{transform}>{}</text>\n",
            style.size,
            escape(style.fill.as_str()),
            style.anchor.as_str(),
            escape(content)
        ));
    }

    /// Start a group whose contents are shifted by `(dx, dy)`.
    pub fn begin_group(&mut self, dx: f32, dy: f32) {
        self.body
            .push_str(&format!("<g transform=\"translate({dx:.2} {dy:.2})\">\n"));
    }

    pub fn end_group(&mut self) {
        self.body.push_str("</g>\n");
    }

    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{}</svg>\n",
            self.body,
            w = self.width,
            h = self.height,
        )
    }
}

/// Sequential palettes, light to dark.
pub(crate) const RD_PU: &[(u8, u8, u8)] = &[
    (0xff, 0xf7, 0xf3),
    (0xfd, 0xe0, 0xdd),
    (0xfc, 0xc5, 0xc0),
    (0xfa, 0x9f, 0xb5),
    (0xf7, 0x68, 0xa1),
    (0xdd, 0x34, 0x97),
    (0xae, 0x01, 0x7e),
    (0x7a, 0x01, 0x77),
    (0x49, 0x00, 0x6a),
];

pub(crate) const BLUES: &[(u8, u8, u8)] = &[
    (0xf7, 0xfb, 0xff),
    (0xde, 0xeb, 0xf7),
    (0xc6, 0xdb, 0xef),
    (0x9e, 0xca, 0xe1),
    (0x6b, 0xae, 0xd6),
    (0x42, 0x92, 0xc6),
    (0x21, 0x71, 0xb5),
    (0x08, 0x51, 0x9c),
    (0x08, 0x30, 0x6b),
];

pub(crate) const VIRIDIS: &[(u8, u8, u8)] = &[
    (0x44, 0x01, 0x54),
    (0x48, 0x28, 0x78),
    (0x3e, 0x49, 0x89),
    (0x31, 0x68, 0x8e),
    (0x26, 0x82, 0x8e),
    (0x1f, 0x9e, 0x89),
    (0x35, 0xb7, 0x79),
    (0x6e, 0xce, 0x58),
    (0xb5, 0xde, 0x2b),
    (0xfd, 0xe7, 0x25),
];

pub(crate) const SPECTRAL: &[(u8, u8, u8)] = &[
    (0x77, 0x00, 0x88),
    (0x00, 0x00, 0xdd),
    (0x00, 0x99, 0xdd),
    (0x00, 0xaa, 0x88),
    (0x00, 0xbb, 0x00),
    (0x99, 0xee, 0x00),
    (0xff, 0xcc, 0x00),
    (0xff, 0x00, 0x00),
    (0xcc, 0x00, 0x00),
];

/// Color at `t` in `[0, 1]` along a palette, as `#rrggbb`.
pub(crate) fn color_at(palette: &[(u8, u8, u8)], t: f32) -> String {
    let Some(&last) = palette.last() else {
        return "#000000".to_string();
    };
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (palette.len() - 1) as f32;
    let i = scaled.floor() as usize;
    if i + 1 >= palette.len() {
        return hex(last);
    }
    let f = scaled - i as f32;
    let (a, b) = (palette[i], palette[i + 1]);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * f).round() as u8;
    hex((mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2)))
}

fn hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_at() {
        assert_eq!(color_at(BLUES, 0.0), "#f7fbff");
        assert_eq!(color_at(BLUES, 1.0), "#08306b");
        assert_eq!(color_at(BLUES, 7.0), "#08306b");
        assert_eq!(color_at(&[(0, 0, 0), (255, 255, 255)], 0.5), "#808080");
    }

    #[test]
    fn test_canvas_escapes_text() {
        let mut canvas = SvgCanvas::new(100.0, 50.0, "white");
        canvas.text(10.0, 20.0, "a < b & c", &TextStyle::new(12.0).rotation(90.0));
        let svg = canvas.finish();

        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"100\""));
        assert!(svg.contains("a &lt; b &amp; c"));
        assert!(svg.contains("rotate(-90.0 10.00 20.00)"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("año", 10.0), 18.0);
    }
}
