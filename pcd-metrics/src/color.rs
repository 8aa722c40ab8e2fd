//! CIE L*a*b* conversion and the CIEDE2000 color difference.

use pcd_core::pointcloud::point::Color;

// D65 reference white, XYZ scaled to 0..100.
const WHITE_X: f64 = 95.047;
const WHITE_Y: f64 = 100.000;
const WHITE_Z: f64 = 108.883;

const LAB_EPSILON: f64 = 0.008856;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    pub fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }

    /// Converts an sRGB triple with channels in 0..255 (D65).
    pub fn from_rgb255(rgb: [f64; 3]) -> Self {
        let r = srgb_to_linear(rgb[0] / 255.0) * 100.0;
        let g = srgb_to_linear(rgb[1] / 255.0) * 100.0;
        let b = srgb_to_linear(rgb[2] / 255.0) * 100.0;

        let x = r * 0.4124564 + g * 0.3575761 + b * 0.1804375;
        let y = r * 0.2126729 + g * 0.7151522 + b * 0.0721750;
        let z = r * 0.0193339 + g * 0.1191920 + b * 0.9503041;

        let fx = lab_f(x / WHITE_X);
        let fy = lab_f(y / WHITE_Y);
        let fz = lab_f(z / WHITE_Z);

        Self {
            l: (116.0 * fy - 16.0).max(0.0),
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn lab_f(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

/// CIEDE2000 with unit weighting factors (kL = kC = kH = 1).
pub fn ciede2000(lab1: &Lab, lab2: &Lab) -> f64 {
    let c1 = lab1.a.hypot(lab1.b);
    let c2 = lab2.a.hypot(lab2.b);
    let c_avg = (c1 + c2) / 2.0;

    let c_avg_7 = c_avg.powi(7);
    let g = 0.5 * (1.0 - (c_avg_7 / (c_avg_7 + 25.0_f64.powi(7))).sqrt());

    let a1_prime = lab1.a * (1.0 + g);
    let a2_prime = lab2.a * (1.0 + g);

    let c1_prime = a1_prime.hypot(lab1.b);
    let c2_prime = a2_prime.hypot(lab2.b);

    let h1_prime = hue_degrees(lab1.b, a1_prime);
    let h2_prime = hue_degrees(lab2.b, a2_prime);

    let delta_l_prime = lab2.l - lab1.l;
    let delta_c_prime = c2_prime - c1_prime;

    let chroma_product = c1_prime * c2_prime;
    let delta_h_prime_deg = if chroma_product == 0.0 {
        0.0
    } else {
        let dh = h2_prime - h1_prime;
        if dh.abs() <= 180.0 {
            dh
        } else if dh > 180.0 {
            dh - 360.0
        } else {
            dh + 360.0
        }
    };
    let delta_h_prime =
        2.0 * chroma_product.sqrt() * (delta_h_prime_deg.to_radians() / 2.0).sin();

    let l_prime_avg = (lab1.l + lab2.l) / 2.0;
    let c_prime_avg = (c1_prime + c2_prime) / 2.0;
    let h_prime_avg = if chroma_product == 0.0 {
        h1_prime + h2_prime
    } else if (h1_prime - h2_prime).abs() <= 180.0 {
        (h1_prime + h2_prime) / 2.0
    } else if h1_prime + h2_prime < 360.0 {
        (h1_prime + h2_prime + 360.0) / 2.0
    } else {
        (h1_prime + h2_prime - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (h_prime_avg - 30.0).to_radians().cos()
        + 0.24 * (2.0 * h_prime_avg).to_radians().cos()
        + 0.32 * (3.0 * h_prime_avg + 6.0).to_radians().cos()
        - 0.20 * (4.0 * h_prime_avg - 63.0).to_radians().cos();

    let delta_theta = 30.0 * (-((h_prime_avg - 275.0) / 25.0).powi(2)).exp();
    let c_prime_avg_7 = c_prime_avg.powi(7);
    let rc = 2.0 * (c_prime_avg_7 / (c_prime_avg_7 + 25.0_f64.powi(7))).sqrt();

    let l_50_sq = (l_prime_avg - 50.0).powi(2);
    let sl = 1.0 + (0.015 * l_50_sq) / (20.0 + l_50_sq).sqrt();
    let sc = 1.0 + 0.045 * c_prime_avg;
    let sh = 1.0 + 0.015 * c_prime_avg * t;
    let rt = -(2.0 * delta_theta).to_radians().sin() * rc;

    let dl = delta_l_prime / sl;
    let dc = delta_c_prime / sc;
    let dh = delta_h_prime / sh;

    (dl * dl + dc * dc + dh * dh + rt * dc * dh).sqrt()
}

fn hue_degrees(b: f64, a_prime: f64) -> f64 {
    if a_prime == 0.0 && b == 0.0 {
        0.0
    } else {
        b.atan2(a_prime).to_degrees().rem_euclid(360.0)
    }
}

/// Perceptual difference between two colors stored in `[0, 1]`.
pub fn color_difference(a: &Color, b: &Color) -> f64 {
    let lab_a = Lab::from_rgb255(a.to_rgb255());
    let lab_b = Lab::from_rgb255(b.to_rgb255());
    ciede2000(&lab_a, &lab_b)
}
