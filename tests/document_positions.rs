//! Scripted annotation sessions over document-like positions.
//!
//! Positions here mimic text boundaries in a rendered document: a path of
//! child indices down to a text node plus a character offset inside it,
//! compared in document order by a caller-supplied comparator.

use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use metareplay::Comparator;
use metareplay::Interval;
use metareplay::IntervalIndex;
use metareplay::MetaReplay;
use metareplay::ReplayError;
use metareplay::Transition;
use metareplay::display::group_by_target;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Boundary {
    path: Vec<u32>,
    offset: u32,
}

fn at(path: &[u32], offset: u32) -> Boundary {
    return Boundary { path: path.to_vec(), offset };
}

/// Document order: earlier paths first, then earlier offsets.
#[derive(Clone, Copy, Debug)]
struct DocumentOrder;

impl Comparator<Boundary> for DocumentOrder {
    fn compare(&self, a: &Boundary, b: &Boundary) -> Ordering {
        return a.path.cmp(&b.path).then(a.offset.cmp(&b.offset));
    }
}

fn label(assignments: &[(&str, &str, &str)]) -> Transition {
    return assignments.iter().copied().collect();
}

const TWILIGHT: &str = r#"character="Twilight Sparkle""#;
const SPIKE: &str = r#"character="Spike""#;

#[test]
fn session_over_paragraphs() {
    let mut replay = MetaReplay::with_comparator(DocumentOrder);

    let intro = label(&[(TWILIGHT, "emotion", "curious"), (TWILIGHT, "pace", "normal")]);
    let shout = label(&[(TWILIGHT, "emotion", "angry")]);
    let spike = label(&[(SPIKE, "emotion", "nervous")]);
    let calm = label(&[(TWILIGHT, "emotion", "calm")]);

    replay.add(at(&[0, 0], 0), &intro);
    replay.add(at(&[2, 1], 14), &calm);
    replay.add(at(&[1, 0], 30), &shout);
    replay.add(at(&[1, 0], 31), &spike);

    let state = replay.get(&at(&[1, 2], 0));
    assert_eq!(state.get(TWILIGHT, "emotion"), Some("angry"));
    assert_eq!(state.get(TWILIGHT, "pace"), Some("normal"));
    assert_eq!(state.get(SPIKE, "emotion"), Some("nervous"));

    let later = replay.get(&at(&[3], 0));
    assert_eq!(later.get(TWILIGHT, "emotion"), Some("calm"));
    assert_eq!(later.get(SPIKE, "emotion"), Some("nervous"));

    // Undo the outburst: the middle paragraph falls back to the intro.
    replay.remove(&at(&[1, 0], 30), &shout).unwrap();
    assert_eq!(replay.get(&at(&[1, 2], 0)).get(TWILIGHT, "emotion"), Some("curious"));
    assert_eq!(replay.get(&at(&[3], 0)).get(TWILIGHT, "emotion"), Some("calm"));

    // Before the first label nothing is known.
    assert!(replay.get(&at(&[0], 0)).is_empty());
}

#[test]
fn display_groups_effective_state() {
    let mut replay = MetaReplay::with_comparator(DocumentOrder);
    replay.add(at(&[0], 0), &label(&[(TWILIGHT, "emotion", "happy"), (SPIKE, "pace", "fast")]));
    replay.add(at(&[0], 5), &label(&[(SPIKE, "emotion", "sleepy")]));

    let groups = group_by_target(replay.get(&at(&[0], 9)));
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].label, Some(("character".to_string(), "Spike".to_string())));
    assert_eq!(
        groups[0].assignments,
        vec![
            ("emotion".to_string(), "sleepy".to_string()),
            ("pace".to_string(), "fast".to_string()),
        ]
    );
    assert_eq!(groups[1].label, Some(("character".to_string(), "Twilight Sparkle".to_string())));
}

#[test]
fn removal_errors_leave_state_alone() {
    let mut replay = MetaReplay::with_comparator(DocumentOrder);
    let happy = label(&[(TWILIGHT, "emotion", "happy")]);
    let stranger = label(&[(TWILIGHT, "emotion", "sad")]);
    replay.add(at(&[0], 3), &happy);

    let err = replay.remove(&at(&[0], 4), &happy).unwrap_err();
    assert!(err.is_unknown_position());
    assert_eq!(
        replay.remove(&at(&[0], 3), &stranger),
        Err(ReplayError::UnknownTransition { id: stranger.id() })
    );
    assert_eq!(replay.get(&at(&[9], 0)).get(TWILIGHT, "emotion"), Some("happy"));
}

#[test]
fn listener_sees_every_commit() {
    let mut replay = MetaReplay::with_comparator(DocumentOrder);
    let seen = Arc::new(Mutex::new(0));
    let counter = seen.clone();
    replay.on_update(move || *counter.lock().unwrap() += 1);

    let happy = label(&[(TWILIGHT, "emotion", "happy")]);
    replay.add(at(&[0], 1), &happy);
    replay.add(at(&[0], 2), &label(&[(SPIKE, "emotion", "bored")]));
    replay.remove(&at(&[0], 1), &happy).unwrap();
    assert_eq!(*seen.lock().unwrap(), 3);
}

#[test]
fn labels_covering_selection() {
    let mut labels = IntervalIndex::with_comparator(DocumentOrder);
    labels.add(Interval::new(at(&[0], 0), at(&[2], 10)), "dialogue#1");
    labels.add(Interval::new(at(&[1], 4), at(&[1], 9)), "whisper#2");
    labels.add(Interval::new(at(&[2], 0), at(&[3], 0)), "scene#3");

    let mut covering: Vec<_> = labels.get_all(&at(&[1], 5)).into_iter().collect();
    covering.sort();
    assert_eq!(covering, vec!["dialogue#1", "whisper#2"]);

    let mut covering: Vec<_> = labels.get_all(&at(&[2], 10)).into_iter().collect();
    covering.sort();
    assert_eq!(covering, vec!["dialogue#1", "scene#3"]);

    labels.remove(&Interval::new(at(&[0], 0), at(&[2], 10)), &"dialogue#1");
    let covering: Vec<_> = labels.get_all(&at(&[1], 5)).into_iter().collect();
    assert_eq!(covering, vec!["whisper#2"]);
    assert!(labels.get_all(&at(&[4], 0)).is_empty());
}
