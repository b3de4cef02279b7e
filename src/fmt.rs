/// `val` rounded to `decimals` places, thousands grouped with commas.
fn grouped(val: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, val.abs());
    let (int_part, frac) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let lead = int_part.len() % 3;
    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    if val < 0.0 {
        out.push('-');
    }
    for (i, c) in int_part.char_indices() {
        if i > 0 && (i + 3 - lead) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if let Some(frac) = frac {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Hour figures: `1,234.25`.
pub fn hours(val: f64) -> String {
    grouped(val, 2)
}

pub fn percent(val: f64) -> String {
    format!("{}%", grouped(val, 1))
}
