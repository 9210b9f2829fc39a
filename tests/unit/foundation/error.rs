use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MergeError::config_invalid("x")
            .to_string()
            .contains("invalid settings:")
    );
    assert!(
        MergeError::NoSourceImagesResolved { declared: 3 }
            .to_string()
            .contains("no source images could be resolved (3 declared)")
    );
    assert!(
        MergeError::color_format("shadowColor", "#12")
            .to_string()
            .contains("color format error in shadowColor")
    );
    assert!(
        MergeError::codec("a/b.png", "truncated")
            .to_string()
            .contains("codec error for 'a/b.png': truncated")
    );
}

#[test]
fn in_field_relabels_color_errors_only() {
    let err = MergeError::color_format("color", "xyz").in_field("colorReplacement[2].from");
    match err {
        MergeError::ColorFormat { field, input } => {
            assert_eq!(field, "colorReplacement[2].from");
            assert_eq!(input, "xyz");
        }
        other => panic!("unexpected {other:?}"),
    }

    let err = MergeError::config_invalid("bad").in_field("ignored");
    assert!(matches!(err, MergeError::ConfigInvalid(msg) if msg == "bad"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MergeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn io_error_keeps_path_and_source() {
    let err = MergeError::io(
        "missing.json",
        std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    );
    let text = err.to_string();
    assert!(text.contains("missing.json"));
    assert!(text.contains("gone"));
    assert!(std::error::Error::source(&err).is_some());
}
