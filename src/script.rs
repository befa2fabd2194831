//! The stdin script that walks the HTDP menus for one transformation.
//!
//! HTDP has no API; it only reads menu answers from stdin. The sequence below
//! is one fixed path through its menus: transform positions, name the output
//! file, pick both frames, give both epochs as decimal years, read points
//! from a delimited file, then back out and quit. There is no branching or
//! re-prompting; if the engine disagrees it shows up as a non-zero exit or a
//! missing/odd output file.

use std::path::Path;

/// Main menu: transform positions between reference frames and/or dates.
pub const MENU_TRANSFORM_POSITIONS: &str = "4";
/// Epoch format: decimal year.
pub const EPOCH_DECIMAL_YEAR: &str = "2";
/// Point source: `LAT,LON,EHT,TEXT` delimited file.
pub const POINTS_FROM_FILE: &str = "3";
/// Return to the main menu, and at the main menu, quit.
pub const MENU_BACK: &str = "0";

/// Answers for one run, in the order the engine prompts for them.
pub fn build_script(
    output_path: &Path,
    input_frame: u32,
    output_frame: u32,
    input_epoch: f64,
    output_epoch: f64,
    input_path: &Path,
) -> Vec<String> {
    vec![
        MENU_TRANSFORM_POSITIONS.to_string(),
        output_path.display().to_string(),
        input_frame.to_string(),
        output_frame.to_string(),
        EPOCH_DECIMAL_YEAR.to_string(),
        format_decimal(input_epoch),
        EPOCH_DECIMAL_YEAR.to_string(),
        format_decimal(output_epoch),
        POINTS_FROM_FILE.to_string(),
        input_path.display().to_string(),
        MENU_BACK.to_string(),
        MENU_BACK.to_string(),
    ]
}

/// Join script lines into the exact stdin payload (newline-terminated).
pub fn render(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Plain decimal text that always carries a fractional part (`2005.0`).
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn script_follows_menu_order() {
        let lines = build_script(
            &PathBuf::from("/tmp/htdp_x/results.txt"),
            1,
            25,
            2005.0,
            2020.0,
            &PathBuf::from("/tmp/htdp_x/points.txt"),
        );
        assert_eq!(
            lines,
            vec![
                "4",
                "/tmp/htdp_x/results.txt",
                "1",
                "25",
                "2",
                "2005.0",
                "2",
                "2020.0",
                "3",
                "/tmp/htdp_x/points.txt",
                "0",
                "0",
            ]
        );
    }

    #[test]
    fn render_terminates_every_line() {
        let text = render(&["4".to_string(), "0".to_string()]);
        assert_eq!(text, "4\n0\n");
    }

    #[test]
    fn decimals_have_no_locale_or_exponent() {
        assert_eq!(format_decimal(2005.0), "2005.0");
        assert_eq!(format_decimal(2019.75), "2019.75");
        assert_eq!(format_decimal(1906.0), "1906.0");
        assert_eq!(format_decimal(2010.123456789), "2010.123456789");
    }
}
