// Result formatting, reproducing the display rules of the original
// calculator: tiny magnitudes in scientific notation, long decimals cut to
// 10 significant digits, everything else rounded to 10 decimal places.

/// Format a finite or infinite evaluation result for display.
/// NaN never reaches this function; the pipeline rejects it first.
pub fn format_result(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() };
    }

    let magnitude = n.abs();
    if magnitude > 0.0 && magnitude < 1e-10 {
        return format!("{:.4e}", n);
    }

    let plain = format!("{}", n);
    if plain.len() > 12 {
        return format_significant(n, 10);
    }

    // Precision fix: hide float artifacts like 0.30000000000000004
    let rounded = (n * 1e10).round() / 1e10;
    format!("{}", rounded)
}

/// Round to `digits` significant digits and strip trailing zeros (and a
/// trailing dot). Falls back to scientific notation when the exponent is
/// outside what a plain decimal can carry at that precision.
fn format_significant(n: f64, digits: u32) -> String {
    if n == 0.0 {
        return "0".to_string();
    }

    let exponent = n.abs().log10().floor() as i32;
    if exponent >= digits as i32 || exponent < -7 {
        let s = format!("{:.*e}", digits as usize - 1, n);
        return strip_mantissa_zeros(&s);
    }

    let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
    let s = format!("{:.*}", decimals, n);
    strip_trailing_zeros(&s)
}

fn strip_trailing_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn strip_mantissa_zeros(s: &str) -> String {
    match s.split_once('e') {
        Some((mantissa, exp)) => format!("{}e{}", strip_trailing_zeros(mantissa), exp),
        None => s.to_string(),
    }
}
