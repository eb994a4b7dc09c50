//! Pure calculation functions for variant widths and dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Widths to render for a source of the given natural width.
///
/// Every ladder rung strictly below `natural`. If none qualifies the natural
/// width is the only entry. Otherwise the natural width is appended when it
/// does not exceed `cap`, so the full resolution stays selectable.
///
/// # Examples
/// ```
/// # use site_variants::imaging::variant_widths;
/// let ladder = [64, 96, 160, 240, 320, 480];
/// assert_eq!(variant_widths(400, &ladder, 2560), vec![64, 96, 160, 240, 320, 400]);
/// assert_eq!(variant_widths(50, &ladder, 2560), vec![50]);
/// ```
pub fn variant_widths(natural: u32, ladder: &[u32], cap: u32) -> Vec<u32> {
    let mut widths: Vec<u32> = ladder.iter().copied().filter(|&w| w < natural).collect();

    if widths.is_empty() {
        return vec![natural];
    }

    if !widths.contains(&natural) && natural <= cap {
        widths.push(natural);
    }

    widths
}

/// Height of a rendition scaled to `width`, preserving aspect ratio.
///
/// Never enlarges: widths above the natural width yield the natural height.
/// The result is at least 1.
pub fn scaled_height(natural: (u32, u32), width: u32) -> u32 {
    let (nat_w, nat_h) = natural;
    if nat_w == 0 || width >= nat_w {
        return nat_h.max(1);
    }
    let h = (nat_h as f64 * width as f64 / nat_w as f64).round() as u32;
    h.max(1)
}
