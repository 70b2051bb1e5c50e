//! Presenting a `MetaState` to a reader.
//!
//! Targets are usually label assignments such as `character="Twilight Sparkle"`.
//! A display shows one box per target, titled by the assigned name and the
//! kind of target, listing each property and its value.

use crate::meta::MetaState;

/// One target's assignments, ready to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetGroup {
    /// The raw target key.
    pub target: String,
    /// `(kind, name)` when the target key is a `kind="name"` assignment.
    pub label: Option<(String, String)>,
    /// `(property, value)` pairs sorted by property.
    pub assignments: Vec<(String, String)>,
}

fn is_keyword(word: &str) -> bool {
    let mut chars = word.chars();
    return match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        _ => false,
    };
}

/// Split `kind="name"` into `("kind", "name")`.
///
/// Whitespace is allowed around the key and the `=`. The name may not
/// contain a quote. Returns `None` for anything else.
pub fn split_assignment(label: &str) -> Option<(&str, &str)> {
    let (kind, rest) = label.split_once('=')?;
    let kind = kind.trim();
    if !is_keyword(kind) {
        return None;
    }

    let quoted = rest.trim().strip_prefix('"')?.strip_suffix('"')?;
    if quoted.contains('"') {
        return None;
    }
    return Some((kind, quoted));
}

/// Group a state by target, ordered by target key.
pub fn group_by_target(state: &MetaState) -> Vec<TargetGroup> {
    let mut groups: Vec<TargetGroup> = state
        .targets()
        .map(|(target, props)| {
            let mut assignments: Vec<(String, String)> =
                props.iter().map(|(p, v)| (p.clone(), v.clone())).collect();
            assignments.sort();
            TargetGroup {
                target: target.to_string(),
                label: split_assignment(target).map(|(k, n)| (k.to_string(), n.to_string())),
                assignments,
            }
        })
        .collect();
    groups.sort_by(|a, b| a.target.cmp(&b.target));
    return groups;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split() {
        assert_eq!(
            split_assignment(r#"character="Twilight Sparkle""#),
            Some(("character", "Twilight Sparkle"))
        );
        assert_eq!(split_assignment(r#"  voice-id = "?"  "#), Some(("voice-id", "?")));
        assert_eq!(split_assignment(r#"x="""#), Some(("x", "")));
        assert_eq!(split_assignment("character"), None);
        assert_eq!(split_assignment(r#"9lives="x""#), None);
        assert_eq!(split_assignment(r#"a="b"c""#), None);
        assert_eq!(split_assignment("a=b"), None);
    }

    #[test]
    fn groups_sorted() {
        let state: MetaState = [
            (r#"character="Rarity""#, "emotion", "smug"),
            (r#"character="Applejack""#, "pace", "slow"),
            (r#"character="Applejack""#, "emotion", "tired"),
            ("narrator", "volume", "low"),
        ]
        .into_iter()
        .collect();

        let groups = group_by_target(&state);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].label, Some(("character".to_string(), "Applejack".to_string())));
        assert_eq!(
            groups[0].assignments,
            vec![
                ("emotion".to_string(), "tired".to_string()),
                ("pace".to_string(), "slow".to_string()),
            ]
        );
        assert_eq!(groups[1].label, Some(("character".to_string(), "Rarity".to_string())));
        assert_eq!(groups[2].target, "narrator");
        assert_eq!(groups[2].label, None);
    }

    #[test]
    fn empty_state() {
        assert!(group_by_target(&MetaState::new()).is_empty());
    }
}
