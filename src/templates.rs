use std::collections::HashMap;

use tera::Tera;

use crate::config::{SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use crate::error::AppError;

/// Initialize the Tera template engine from a glob such as `templates/**/*`
pub fn init_templates(glob: &str) -> Result<Tera, AppError> {
    let mut tera = Tera::new(glob)?;
    register_filters(&mut tera);
    Ok(tera)
}

/// Add the custom filters used by the dashboard
pub fn register_filters(tera: &mut Tera) {
    tera.register_filter("duration", duration_filter);
}

/// Render a number of seconds as a compact duration (e.g., "1h 2m 3s")
fn duration_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let secs = value
        .as_f64()
        .ok_or_else(|| tera::Error::msg("duration filter expects a number"))?;

    if secs < 0.0 {
        return Err(tera::Error::msg("duration filter expects a non-negative number"));
    }

    Ok(tera::Value::String(format_duration(secs as u64)))
}

fn format_duration(total: u64) -> String {
    let days = total / SECONDS_PER_DAY;
    let hours = (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let minutes = (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total % SECONDS_PER_MINUTE;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    // Always show seconds for sub-minute durations
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{}s", seconds));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(60), "1m");
        assert_eq!(format_duration(3723), "1h 2m 3s");
        assert_eq!(format_duration(90061), "1d 1h 1m 1s");
        assert_eq!(format_duration(86400), "1d");
    }

    #[test]
    fn test_duration_filter_in_template() {
        let mut tera = Tera::default();
        register_filters(&mut tera);
        tera.add_raw_template("t", "{{ secs | duration }}").unwrap();

        let mut context = tera::Context::new();
        context.insert("secs", &125.7);
        assert_eq!(tera.render("t", &context).unwrap(), "2m 5s");
    }

    #[test]
    fn test_duration_filter_rejects_strings() {
        let args = HashMap::new();
        assert!(duration_filter(&tera::Value::String("soon".into()), &args).is_err());
        assert!(duration_filter(&serde_json::json!(-1), &args).is_err());
    }

    #[test]
    fn test_dashboard_template_loads() {
        let tera = init_templates(crate::config::TEMPLATE_GLOB).unwrap();
        assert!(tera
            .get_template_names()
            .any(|name| name == crate::config::DASHBOARD_TEMPLATE));
    }
}
