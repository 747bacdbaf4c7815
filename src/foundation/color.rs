/// Straight-alpha RGBA8 packed into one `u32`.
///
/// Byte order is little-endian `[r, g, b, a]`, so [`Color::to_le_bytes`] yields bytes in the
/// order uploaders expect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0);

    /// Pack four channels.
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self((r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24))
    }

    /// Red channel.
    pub const fn red(self) -> u8 {
        self.0 as u8
    }

    /// Green channel.
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel.
    pub const fn blue(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Alpha channel.
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Channels in `[r, g, b, a]` order.
    pub const fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Unpack from `[r, g, b, a]`.
    pub const fn from_le_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }

    /// Per-channel linear interpolation; `t` is clamped into `[0, 1]`.
    pub fn lerp(from: Self, to: Self, t: f32) -> Self {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| -> u8 {
            let a = f32::from(a);
            let b = f32::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        };
        Self::from_rgba(
            mix(from.red(), to.red()),
            mix(from.green(), to.green()),
            mix(from.blue(), to.blue()),
            mix(from.alpha(), to.alpha()),
        )
    }

    /// Straight-alpha "source over": `top` drawn over `bottom`.
    pub fn over(top: Self, bottom: Self) -> Self {
        let ta = u32::from(top.alpha());
        if ta == 255 {
            return top;
        }
        if ta == 0 {
            return bottom;
        }

        let ba = u32::from(bottom.alpha());
        let ba_scaled = ba * (255 - ta);
        // Alpha in 255*255 units so the division happens once.
        let out_a = ta * 255 + ba_scaled;
        if out_a == 0 {
            return Self::TRANSPARENT;
        }
        let channel = |tc: u8, bc: u8| -> u8 {
            let num = u32::from(tc) * ta * 255 + u32::from(bc) * ba_scaled;
            ((num + out_a / 2) / out_a) as u8
        };

        Self::from_rgba(
            channel(top.red(), bottom.red()),
            channel(top.green(), bottom.green()),
            channel(top.blue(), bottom.blue()),
            ((out_a + 127) / 255) as u8,
        )
    }

    /// Box-filter average of four samples, rounding to nearest.
    pub fn average4(a: Self, b: Self, c: Self, d: Self) -> Self {
        let avg = |w: u8, x: u8, y: u8, z: u8| -> u8 {
            ((u16::from(w) + u16::from(x) + u16::from(y) + u16::from(z) + 2) / 4) as u8
        };
        Self::from_rgba(
            avg(a.red(), b.red(), c.red(), d.red()),
            avg(a.green(), b.green(), c.green(), d.green()),
            avg(a.blue(), b.blue(), c.blue(), d.blue()),
            avg(a.alpha(), b.alpha(), c.alpha(), d.alpha()),
        )
    }
}

impl From<[u8; 4]> for Color {
    fn from(value: [u8; 4]) -> Self {
        Self::from_le_bytes(value)
    }
}

impl From<Color> for [u8; 4] {
    fn from(value: Color) -> Self {
        value.to_le_bytes()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
