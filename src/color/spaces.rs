//! Predefined `color()` spaces converted into gamma-encoded sRGB.
//!
//! Matrices and transfer functions follow CSS Color Module Level 4. All
//! functions return unclamped sRGB components; gamut mapping (per-channel
//! clipping) happens when the color is painted onto the scratch surface.

type Mat3 = [[f64; 3]; 3];

fn mul(m: &Mat3, v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

const D50_TO_D65: Mat3 = [
    [0.955_473_452_704_218_2, -0.023_098_536_874_261_423, 0.063_259_308_661_021_7],
    [-0.028_369_706_963_208_136, 1.009_995_458_005_822_6, 0.021_041_398_966_943_008],
    [0.012_314_001_688_319_899, -0.020_507_696_433_477_912, 1.330_365_936_608_075_3],
];

const XYZ_D65_TO_LINEAR_SRGB: Mat3 = [
    [3.240_969_941_904_522_6, -1.537_383_177_570_094, -0.498_610_760_293_003_4],
    [-0.969_243_636_280_879_6, 1.875_967_501_507_720_2, 0.041_555_057_407_175_59],
    [0.055_630_079_696_993_66, -0.203_976_958_888_976_52, 1.056_971_514_242_878_6],
];

const LINEAR_P3_TO_XYZ_D65: Mat3 = [
    [0.486_570_948_648_216_2, 0.265_667_693_169_093_06, 0.198_217_285_234_362_5],
    [0.228_974_564_069_748_8, 0.691_738_521_836_506_4, 0.079_286_914_093_745],
    [0.0, 0.045_113_381_858_902_64, 1.043_944_368_900_976],
];

const LINEAR_A98_TO_XYZ_D65: Mat3 = [
    [0.576_669_042_910_130_5, 0.185_558_237_906_546_3, 0.188_228_646_234_994_7],
    [0.297_344_975_250_536_05, 0.627_363_566_255_466_1, 0.075_291_458_493_997_88],
    [0.027_031_361_386_412_34, 0.070_688_852_535_827_23, 0.991_337_536_837_638_8],
];

const LINEAR_PROPHOTO_TO_XYZ_D50: Mat3 = [
    [0.797_760_489_672_302_7, 0.135_185_837_175_740_31, 0.031_349_349_581_524_8],
    [0.288_071_128_229_293_4, 0.711_843_217_810_101_4, 0.000_085_653_960_605_259_02],
    [0.0, 0.0, 0.825_104_602_510_460_1],
];

const LINEAR_REC2020_TO_XYZ_D65: Mat3 = [
    [0.636_958_048_301_291_4, 0.144_616_903_586_208_32, 0.168_880_975_164_172_1],
    [0.262_700_212_011_267_1, 0.677_998_071_518_871_5, 0.059_301_716_469_861_96],
    [0.0, 0.028_072_693_049_087_428, 1.060_985_057_710_791],
];

pub fn srgb_to_linear(c: f64) -> f64 {
    let a = c.abs();
    if a <= 0.04045 {
        c / 12.92
    } else {
        c.signum() * ((a + 0.055) / 1.055).powf(2.4)
    }
}

pub fn linear_to_srgb(c: f64) -> f64 {
    let a = c.abs();
    if a <= 0.003_130_8 {
        c * 12.92
    } else {
        c.signum() * (1.055 * a.powf(1.0 / 2.4) - 0.055)
    }
}

fn linear_srgb_to_srgb(v: [f64; 3]) -> [f64; 3] {
    [linear_to_srgb(v[0]), linear_to_srgb(v[1]), linear_to_srgb(v[2])]
}

pub fn xyz_d65_to_srgb(xyz: [f64; 3]) -> [f64; 3] {
    linear_srgb_to_srgb(mul(&XYZ_D65_TO_LINEAR_SRGB, xyz))
}

pub fn xyz_d50_to_srgb(xyz: [f64; 3]) -> [f64; 3] {
    xyz_d65_to_srgb(mul(&D50_TO_D65, xyz))
}

/// Predefined RGB and XYZ spaces accepted by `color()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredefinedSpace {
    Srgb,
    SrgbLinear,
    DisplayP3,
    A98Rgb,
    ProphotoRgb,
    Rec2020,
    XyzD50,
    XyzD65,
}

impl PredefinedSpace {
    pub fn from_name(name: &str) -> Option<Self> {
        let space = match name.to_ascii_lowercase().as_str() {
            "srgb" => PredefinedSpace::Srgb,
            "srgb-linear" => PredefinedSpace::SrgbLinear,
            "display-p3" => PredefinedSpace::DisplayP3,
            "a98-rgb" => PredefinedSpace::A98Rgb,
            "prophoto-rgb" => PredefinedSpace::ProphotoRgb,
            "rec2020" => PredefinedSpace::Rec2020,
            "xyz-d50" => PredefinedSpace::XyzD50,
            "xyz" | "xyz-d65" => PredefinedSpace::XyzD65,
            _ => return None,
        };
        Some(space)
    }

    /// Convert components in this space to sRGB
    pub fn to_srgb(self, c: [f64; 3]) -> [f64; 3] {
        match self {
            PredefinedSpace::Srgb => c,
            PredefinedSpace::SrgbLinear => linear_srgb_to_srgb(c),
            PredefinedSpace::DisplayP3 => {
                let lin = c.map(srgb_to_linear);
                xyz_d65_to_srgb(mul(&LINEAR_P3_TO_XYZ_D65, lin))
            }
            PredefinedSpace::A98Rgb => {
                let lin = c.map(|v| v.signum() * v.abs().powf(563.0 / 256.0));
                xyz_d65_to_srgb(mul(&LINEAR_A98_TO_XYZ_D65, lin))
            }
            PredefinedSpace::ProphotoRgb => {
                const ET2: f64 = 16.0 / 512.0;
                let lin = c.map(|v| {
                    if v.abs() <= ET2 {
                        v / 16.0
                    } else {
                        v.signum() * v.abs().powf(1.8)
                    }
                });
                xyz_d50_to_srgb(mul(&LINEAR_PROPHOTO_TO_XYZ_D50, lin))
            }
            PredefinedSpace::Rec2020 => {
                const ALPHA: f64 = 1.099_296_826_809_44;
                const BETA: f64 = 0.018_053_968_510_807;
                let lin = c.map(|v| {
                    if v.abs() < BETA * 4.5 {
                        v / 4.5
                    } else {
                        v.signum() * ((v.abs() + ALPHA - 1.0) / ALPHA).powf(1.0 / 0.45)
                    }
                });
                xyz_d65_to_srgb(mul(&LINEAR_REC2020_TO_XYZ_D65, lin))
            }
            PredefinedSpace::XyzD50 => xyz_d50_to_srgb(c),
            PredefinedSpace::XyzD65 => xyz_d65_to_srgb(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_u8(c: [f64; 3]) -> [u8; 3] {
        c.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    #[test]
    fn srgb_is_the_identity() {
        assert_eq!(PredefinedSpace::Srgb.to_srgb([0.1, 0.2, 0.3]), [0.1, 0.2, 0.3]);
    }

    #[test]
    fn xyz_d65_white_is_white() {
        let white = PredefinedSpace::XyzD65.to_srgb([0.950_47, 1.0, 1.088_83]);
        assert_eq!(to_u8(white), [255, 255, 255]);
    }

    #[test]
    fn display_p3_red_clips_to_srgb_red() {
        assert_eq!(to_u8(PredefinedSpace::DisplayP3.to_srgb([1.0, 0.0, 0.0])), [255, 0, 0]);
    }

    #[test]
    fn srgb_transfer_round_trips() {
        for v in [0.0, 0.001, 0.2, 0.5, 0.9, 1.0] {
            assert!((linear_to_srgb(srgb_to_linear(v)) - v).abs() < 1e-9);
        }
    }
}
