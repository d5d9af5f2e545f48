use crate::config::{parse_parameters, parse_value};
use crate::renderer::RendererError;
use crate::scene::primitive::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowMapType {
    Disabled,
    Basic,
    Pcf,
    PcfSoft,
}

/// Output settings shared by renderer backends.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererSettings {
    pub antialias: bool,
    pub clear_color: Color,
    pub clear_alpha: f32,
    /// Clear the framebuffer before each frame.
    pub auto_clear: bool,
    pub shadow_map: ShadowMapType,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            antialias: true,
            clear_color: Color::WHITE,
            clear_alpha: 1.0,
            auto_clear: true,
            shadow_map: ShadowMapType::PcfSoft,
        }
    }
}

impl RendererSettings {
    /// Parse settings from a parameter string such as
    /// `"antialias=false,clear_color=0x202020,shadow_map=basic"`.
    pub fn from_parameters(parameters: &str) -> Result<Self, RendererError> {
        let mut settings = Self::default();
        for (key, value) in parse_parameters(parameters) {
            match key.as_str() {
                "antialias" => settings.antialias = parse_value(&key, &value)?,
                "auto_clear" => settings.auto_clear = parse_value(&key, &value)?,
                "clear_alpha" => {
                    let alpha: f32 = parse_value(&key, &value)?;
                    if !(0.0..=1.0).contains(&alpha) {
                        return Err(RendererError::InvalidParameters(format!(
                            "clear_alpha must be within 0..=1, got {}",
                            alpha
                        )));
                    }
                    settings.clear_alpha = alpha;
                }
                "clear_color" => {
                    let hex = value
                        .strip_prefix("0x")
                        .or_else(|| value.strip_prefix('#'))
                        .unwrap_or(&value);
                    let rgb = u32::from_str_radix(hex, 16)
                        .ok()
                        .filter(|rgb| *rgb <= 0xffffff)
                        .ok_or_else(|| RendererError::InvalidParameters(format!("Invalid clear_color: {}", value)))?;
                    settings.clear_color = Color(rgb);
                }
                "shadow_map" => {
                    settings.shadow_map = match value.as_str() {
                        "off" | "disabled" => ShadowMapType::Disabled,
                        "basic" => ShadowMapType::Basic,
                        "pcf" => ShadowMapType::Pcf,
                        "pcf_soft" => ShadowMapType::PcfSoft,
                        _ => {
                            return Err(RendererError::InvalidParameters(format!(
                                "Invalid shadow_map: {}",
                                value
                            )))
                        }
                    }
                }
                _ => return Err(RendererError::InvalidParameters(format!("Unsupported parameter: {}", key))),
            }
        }
        Ok(settings)
    }

    pub fn clear_rgba(&self) -> [u8; 4] {
        self.clear_color.to_rgba((self.clear_alpha * 255.0).round() as u8)
    }
}
