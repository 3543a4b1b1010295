// ============================================================================
// THEME SERVICE - Paleta derivada del color institucional
// ============================================================================
// El color primario viene de la institución del usuario; el resto de la
// paleta (contraste, sombra, tinte, tono apagado) se calcula a partir de él.
// ============================================================================

use crate::state::reactivity::{ReactiveState, Subscription};
use crate::utils::constants::DEFAULT_PRIMARY_COLOR;

const DARK_CONTRAST: Rgb = Rgb { r: 17.0, g: 15.0, b: 73.0 };
const WHITE: Rgb = Rgb { r: 255.0, g: 255.0, b: 255.0 };
const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemePalette {
    pub primary: String,
    /// `"r, g, b"`
    pub primary_rgb: String,
    pub contrast: String,
    pub contrast_rgb: String,
    pub shade: String,
    pub tint: String,
    pub muted: String,
    pub muted_contrast: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Rgb {
    r: f64,
    g: f64,
    b: f64,
}

impl Rgb {
    fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        let channel = |i: usize| {
            digits
                .get(i..i + 2)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .map(f64::from)
        };
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", clamp(self.r), clamp(self.g), clamp(self.b))
    }

    fn to_rgb_string(self) -> String {
        format!("{}, {}, {}", self.r.round(), self.g.round(), self.b.round())
    }

    fn mix(self, target: Rgb, weight: f64) -> Rgb {
        let w = weight.clamp(0.0, 1.0);
        Rgb {
            r: self.r * (1.0 - w) + target.r * w,
            g: self.g * (1.0 - w) + target.g * w,
            b: self.b * (1.0 - w) + target.b * w,
        }
    }

    /// Luminancia relativa sRGB (WCAG)
    fn relative_luminance(self) -> f64 {
        let linear = |value: f64| {
            let channel = value / 255.0;
            if channel <= 0.03928 {
                channel / 12.92
            } else {
                ((channel + 0.055) / 1.055).powf(2.4)
            }
        };
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    fn contrast(self) -> Rgb {
        if self.relative_luminance() > 0.6 {
            DARK_CONTRAST
        } else {
            WHITE
        }
    }
}

fn clamp(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// `#abc`, `abc`, `#aabbcc` o `AABBCC` → `#aabbcc`. Cualquier otra cosa → `None`.
pub fn normalize_hex(color: &str) -> Option<String> {
    let trimmed = color.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digits = digits.to_ascii_lowercase();
    match digits.len() {
        6 => Some(format!("#{}", digits)),
        3 => Some(digits.chars().fold(String::from("#"), |mut hex, c| {
            hex.push(c);
            hex.push(c);
            hex
        })),
        _ => None,
    }
}

/// Paleta completa para un color ya normalizado
pub fn build_palette(primary_hex: &str) -> ThemePalette {
    let (primary_hex, primary) = match Rgb::from_hex(primary_hex) {
        Some(rgb) => (primary_hex.to_string(), rgb),
        None => (DEFAULT_PRIMARY_COLOR.to_string(), default_rgb()),
    };

    let contrast = primary.contrast();
    let muted = primary.mix(WHITE, 0.72);

    ThemePalette {
        primary: primary_hex,
        primary_rgb: primary.to_rgb_string(),
        contrast: contrast.to_hex(),
        contrast_rgb: contrast.to_rgb_string(),
        shade: primary.mix(BLACK, 0.18).to_hex(),
        tint: primary.mix(WHITE, 0.16).to_hex(),
        muted: muted.to_hex(),
        muted_contrast: muted.contrast().to_hex(),
    }
}

fn default_rgb() -> Rgb {
    Rgb::from_hex(DEFAULT_PRIMARY_COLOR).unwrap_or(Rgb {
        r: 74.0,
        g: 58.0,
        b: 255.0,
    })
}

/// Variables CSS que expone la paleta
pub fn css_variables(palette: &ThemePalette) -> Vec<(&'static str, String)> {
    vec![
        ("--color-primary", palette.primary.clone()),
        ("--color-secondary", palette.primary.clone()),
        ("--ion-color-primary", palette.primary.clone()),
        ("--ion-color-primary-rgb", palette.primary_rgb.clone()),
        ("--ion-color-primary-contrast", palette.contrast.clone()),
        ("--ion-color-primary-contrast-rgb", palette.contrast_rgb.clone()),
        ("--ion-color-primary-shade", palette.shade.clone()),
        ("--ion-color-primary-tint", palette.tint.clone()),
        ("--app-primary-contrast", palette.contrast.clone()),
        ("--app-primary-muted", palette.muted.clone()),
        ("--app-primary-muted-contrast", palette.muted_contrast.clone()),
    ]
}

/// Escribe la paleta en el `style` de `<html>`
pub fn apply_css_variables(palette: &ThemePalette) {
    use wasm_bindgen::JsCast;

    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
        .and_then(|e| e.dyn_into::<web_sys::HtmlElement>().ok());

    let Some(root) = root else {
        log::warn!("⚠️ [THEME] No hay documento para aplicar la paleta");
        return;
    };

    let style = root.style();
    for (name, value) in css_variables(palette) {
        if let Err(e) = style.set_property(name, &value) {
            log::warn!("⚠️ [THEME] No se pudo aplicar {}: {:?}", name, e);
        }
    }
}

#[derive(Clone)]
pub struct ThemeService {
    default_color: String,
    palette: ReactiveState<ThemePalette>,
}

impl ThemeService {
    pub fn new(default_color: &str) -> Self {
        let default_color =
            normalize_hex(default_color).unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string());
        Self {
            palette: ReactiveState::new(build_palette(&default_color)),
            default_color,
        }
    }

    /// Aplica un color primario (o el por defecto si es inválido o vacío).
    /// Devuelve `true` si la paleta cambió.
    pub fn apply_primary_color(&self, color: Option<&str>) -> bool {
        let normalized = color
            .and_then(normalize_hex)
            .unwrap_or_else(|| self.default_color.clone());
        let changed = self.palette.set_if_changed(build_palette(&normalized));
        if changed {
            log::info!("🎨 [THEME] Color primario: {}", normalized);
        }
        changed
    }

    pub fn palette(&self) -> ThemePalette {
        self.palette.get()
    }

    pub fn watch(&self) -> Subscription<ThemePalette> {
        self.palette.subscribe()
    }

    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&ThemePalette) + 'static,
    {
        self.palette.on_change(callback);
    }
}
