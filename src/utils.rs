use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;

/// Render a `LabelSelector` in the `labelSelector` query syntax, e.g. `app=web,tier in (a,b)`.
/// Returns `None` when the selector has no requirements at all.
pub fn selector_query(selector: &LabelSelector) -> Option<String> {
    let mut requirements: Vec<String> = selector
        .match_labels
        .iter()
        .flatten()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();

    for expression in selector.match_expressions.iter().flatten() {
        let values = expression.values.clone().unwrap_or_default().join(",");
        let requirement = match expression.operator.as_str() {
            "In" => format!("{} in ({})", expression.key, values),
            "NotIn" => format!("{} notin ({})", expression.key, values),
            "Exists" => expression.key.clone(),
            "DoesNotExist" => format!("!{}", expression.key),
            _ => continue,
        };
        requirements.push(requirement);
    }

    if requirements.is_empty() {
        None
    } else {
        Some(requirements.join(","))
    }
}

pub fn plural_str(length: usize, word: &str) -> String {
    if length == 1 {
        word.trim_end_matches('s').to_string()
    } else {
        word.to_string()
    }
}
