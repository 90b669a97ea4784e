use orbit_core::{CarouselConfig, ContainerHeight, FontSpec, Rgba};

/// Edit buffers for the config fields typed as text. A buffer is applied
/// only once it parses, so half-typed values never reach the carousel.
pub struct CarouselParams {
    pub text_color: String,
    pub font: String,
    pub height: String,
}

impl CarouselParams {
    pub fn from_config(config: &CarouselConfig) -> Self {
        Self {
            text_color: config.text_color.clone(),
            font: config.font.clone(),
            height: config.height.to_string(),
        }
    }

    /// Copies every valid buffer into `config`; returns what was rejected.
    pub fn apply(&self, config: &mut CarouselConfig) -> Vec<String> {
        let mut rejected = Vec::new();
        match Rgba::parse(&self.text_color) {
            Ok(_) => config.text_color = self.text_color.trim().to_string(),
            Err(err) => rejected.push(err.to_string()),
        }
        match FontSpec::parse(&self.font) {
            Ok(_) => config.font = self.font.trim().to_string(),
            Err(err) => rejected.push(err.to_string()),
        }
        match ContainerHeight::parse(&self.height) {
            Ok(height) => config.height = height,
            Err(err) => rejected.push(err.to_string()),
        }
        rejected
    }
}
