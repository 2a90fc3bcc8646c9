/// Reads an on/off switch such as `KPG_RUN_MIGRATIONS`. Accepts `1/0`, `true/false`, `yes/no` and `on/off` in any case.
/// A missing or unrecognised value falls back to `default`.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    value.map_or(default, |v| match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    })
}
