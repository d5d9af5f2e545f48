//! Canvas surface the renderer is bound to.
//!
//! The client size is derived the way a browser lays out a canvas: the CSS
//! style either pins a pixel size or takes a percentage of the container.

/// A CSS length for the canvas style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CssLength {
    Auto,
    Pixels(u32),
    Percent(f32),
}

impl CssLength {
    fn resolve(self, container: u32, intrinsic: u32) -> u32 {
        match self {
            CssLength::Auto => intrinsic,
            CssLength::Pixels(px) => px,
            CssLength::Percent(pct) => ((container as f32) * pct / 100.0).round().max(0.0) as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasStyle {
    pub width: CssLength,
    pub height: CssLength,
}

impl CanvasStyle {
    pub const FILL: CanvasStyle = CanvasStyle {
        width: CssLength::Percent(100.0),
        height: CssLength::Percent(100.0),
    };
}

impl Default for CanvasStyle {
    fn default() -> Self {
        Self {
            width: CssLength::Auto,
            height: CssLength::Auto,
        }
    }
}

/// HTML canvas defaults when no style applies.
pub const INTRINSIC_WIDTH: u32 = 300;
pub const INTRINSIC_HEIGHT: u32 = 150;

#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    container: (u32, u32),
    pub style: CanvasStyle,
    device_pixel_ratio: f32,
}

impl Canvas {
    pub fn new(container_width: u32, container_height: u32) -> Self {
        Self {
            container: (container_width, container_height),
            style: CanvasStyle::default(),
            device_pixel_ratio: 1.0,
        }
    }

    pub fn with_style(mut self, style: CanvasStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = if ratio > 0.0 { ratio } else { 1.0 };
        self
    }

    /// The host layout changed (window resize).
    pub fn set_container_size(&mut self, width: u32, height: u32) {
        self.container = (width, height);
    }

    pub fn container_size(&self) -> (u32, u32) {
        self.container
    }

    pub fn client_width(&self) -> u32 {
        self.style.width.resolve(self.container.0, INTRINSIC_WIDTH)
    }

    pub fn client_height(&self) -> u32 {
        self.style.height.resolve(self.container.1, INTRINSIC_HEIGHT)
    }

    pub fn client_size(&self) -> (u32, u32) {
        (self.client_width(), self.client_height())
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }
}
