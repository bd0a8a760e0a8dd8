//! Key case conversion at the API edge, used only when camelCase JSON is switched on: request
//! keys are aligned to declared view model fields, response keys become camelCase.

use serde_json::{Map, Value};

/// "created_at" -> "createdAt"
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = false;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn rename_keys(obj: &mut Map<String, Value>, f: fn(&str) -> String) {
    let keys: Vec<String> = obj.keys().cloned().collect();
    for k in keys {
        let renamed = f(&k);
        if renamed != k && !obj.contains_key(&renamed) {
            if let Some(v) = obj.remove(&k) {
                obj.insert(renamed, v);
            }
        }
    }
}

/// Renames top-level request keys onto the declared field with the same camelCase spelling.
/// Keys naming a field exactly are kept; undeclared keys are left alone.
pub fn align_keys_to_fields<'a, I>(obj: &mut Map<String, Value>, fields: I)
where
    I: IntoIterator<Item = &'a str>,
{
    let fields: Vec<&str> = fields.into_iter().collect();
    let keys: Vec<String> = obj.keys().cloned().collect();
    for key in keys {
        if fields.contains(&key.as_str()) {
            continue;
        }
        let target = fields
            .iter()
            .find(|f| to_camel_case(f) == to_camel_case(&key));
        if let Some(field) = target {
            if !obj.contains_key(*field) {
                if let Some(v) = obj.remove(&key) {
                    obj.insert(field.to_string(), v);
                }
            }
        }
    }
}

/// Objects and arrays of objects, at any depth.
pub fn value_keys_to_camel_case_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            rename_keys(map, to_camel_case);
            for (_, v) in map.iter_mut() {
                value_keys_to_camel_case_recursive(v);
            }
        }
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                value_keys_to_camel_case_recursive(v);
            }
        }
        _ => {}
    }
}
