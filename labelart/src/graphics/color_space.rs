use log::debug;

/// Color in RGB, each component in range [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn components(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }
}

/// RGB operands come in both [0, 1] and [0, 255] range depending on the encoder
/// produced the file. If any component exceeds 1, all three are scaled down by 255.
pub fn normalize_rgb_triple(r: f64, g: f64, b: f64) -> Rgb {
    if r.max(g).max(b) > 1.0 {
        Rgb::new(r / 255.0, g / 255.0, b / 255.0)
    } else {
        Rgb::new(r, g, b)
    }
}

/// Operands assumed in [0, 1], not normalized.
pub fn cmyk_to_rgb(c: f64, m: f64, y: f64, k: f64) -> Rgb {
    Rgb::new((1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k))
}

pub fn gray_to_rgb(g: f64) -> Rgb {
    Rgb::new(g, g, g)
}

/// Device color spaces selected by `cs`/`CS`, decides how `sc`/`SC` operands
/// are converted to RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    #[default]
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
}

impl ColorSpace {
    /// Resolve color space by its name, abbreviated names used in inline images also
    /// accepted. Returns None for names refer to page resources, such as ICCBased or Pattern.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "DeviceGray" | "G" => Some(Self::DeviceGray),
            "DeviceRGB" | "RGB" => Some(Self::DeviceRGB),
            "DeviceCMYK" | "CMYK" => Some(Self::DeviceCMYK),
            _ => None,
        }
    }

    /// Guess color space by number of color components, used when the color space
    /// is a resource that can not be resolved from the content stream alone.
    pub fn from_components(n: usize) -> Option<Self> {
        match n {
            1 => Some(Self::DeviceGray),
            3 => Some(Self::DeviceRGB),
            4 => Some(Self::DeviceCMYK),
            _ => None,
        }
    }

    pub fn components(&self) -> usize {
        match self {
            Self::DeviceGray => 1,
            Self::DeviceRGB => 3,
            Self::DeviceCMYK => 4,
        }
    }

    /// Convert color to RGB, return None if `color` has less components than required.
    pub fn to_rgb(&self, color: &[f64]) -> Option<Rgb> {
        if color.len() < self.components() {
            debug!(
                "{:?} expects {} components, got {:?}",
                self,
                self.components(),
                color
            );
            return None;
        }

        Some(match self {
            Self::DeviceGray => gray_to_rgb(color[0]),
            Self::DeviceRGB => normalize_rgb_triple(color[0], color[1], color[2]),
            Self::DeviceCMYK => cmyk_to_rgb(color[0], color[1], color[2], color[3]),
        })
    }
}
