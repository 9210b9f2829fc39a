use super::*;

fn listing(names: &[&str]) -> Vec<String> {
    let mut v: Vec<String> = names.iter().map(|s| s.to_string()).collect();
    v.sort();
    v
}

#[test]
fn id_token_is_case_insensitive_and_optional() {
    assert_eq!(substitute_id("face_<ID>.png", Some("c01")), "face_c01.png");
    assert_eq!(substitute_id("Face_<id>_<Id>.png", Some("x")), "Face_x_x.png");
    assert_eq!(substitute_id("face_<ID>.png", None), "face_.png");
    assert_eq!(substitute_id("plain.png", Some("x")), "plain.png");
}

#[test]
fn extension_follows_priority_order() {
    let files = listing(&["eye.gif", "eye.png", "eye.jpeg", "other.bmp"]);
    let ctx = ResolveContext::new(None, &files);
    assert_eq!(resolve_extension("eye.<EXT>", &ctx).as_deref(), Some("eye.png"));
}

#[test]
fn extension_keeps_disk_spelling() {
    let files = listing(&["Mouth.JPG"]);
    let ctx = ResolveContext::new(None, &files);
    assert_eq!(resolve_extension("Mouth.<ext>", &ctx).as_deref(), Some("Mouth.JPG"));
}

#[test]
fn extension_ignores_unsupported_formats() {
    let files = listing(&["eye.tga", "eye.webp"]);
    let ctx = ResolveContext::new(None, &files);
    assert_eq!(resolve_extension("eye.<EXT>", &ctx), None);
}

#[test]
fn extension_probe_wildcards_version_and_keeps_token() {
    let files = listing(&["body_v3.gif", "body_v7.png"]);
    let ctx = ResolveContext::new(None, &files);
    assert_eq!(
        resolve_extension("body_v<VER>.<EXT>", &ctx).as_deref(),
        Some("body_v<VER>.png")
    );
}

#[test]
fn pattern_without_tokens_passes_through() {
    let files = listing(&[]);
    let ctx = ResolveContext::new(Some("id"), &files);
    assert_eq!(resolve("missing.png", &ctx).as_deref(), Some("missing.png"));
    assert_eq!(resolve_version("a.png", &ctx).as_deref(), Some("a.png"));
}

#[test]
fn version_uses_plain_string_ordering() {
    let files = listing(&["bg_v1.png", "bg_v2.png", "bg_v10.png"]);
    let ctx = ResolveContext::new(None, &files);
    // "2" > "10" as strings, so v2 wins over v10.
    assert_eq!(resolve_version("bg_v<VER>.png", &ctx).as_deref(), Some("bg_v2.png"));
}

#[test]
fn version_requires_prefix_and_suffix() {
    let files = listing(&["bg_v1.png", "bg_v9.gif", "xbg_v8.png", "bg_w9.png"]);
    let ctx = ResolveContext::new(None, &files);
    assert_eq!(resolve_version("bg_v<VER>.png", &ctx).as_deref(), Some("bg_v1.png"));
}

#[test]
fn version_without_candidates_is_unresolved() {
    let files = listing(&["other.png"]);
    let ctx = ResolveContext::new(None, &files);
    assert_eq!(resolve_version("bg_v<VER>.png", &ctx), None);
}

#[test]
fn full_chain_resolves_all_tokens() {
    let files = listing(&[
        "hero_arm_v1.png",
        "hero_arm_v2.png",
        "hero_arm_v2.bmp",
        "hero_arm_v3.jpg",
        "villain_arm_v9.png",
    ]);
    let ctx = ResolveContext::new(Some("hero"), &files);
    // bmp has priority; <VER> is then settled among the .bmp files only.
    assert_eq!(
        resolve("<ID>_arm_v<VER>.<EXT>", &ctx).as_deref(),
        Some("hero_arm_v2.bmp")
    );

    let ctx = ResolveContext::new(Some("villain"), &files);
    assert_eq!(
        resolve("<ID>_arm_v<VER>.<EXT>", &ctx).as_deref(),
        Some("villain_arm_v9.png")
    );
}

#[test]
fn unresolved_extension_short_circuits() {
    let files = listing(&["a_v1.tga"]);
    let ctx = ResolveContext::new(None, &files);
    assert_eq!(resolve("a_v<VER>.<EXT>", &ctx), None);
}

#[test]
fn custom_format_priority_is_honored() {
    let files = listing(&["eye.gif", "eye.png"]);
    let ctx = ResolveContext {
        formats: &["gif", "png"],
        ..ResolveContext::new(None, &files)
    };
    assert_eq!(resolve("eye.<EXT>", &ctx).as_deref(), Some("eye.gif"));
}

#[test]
fn read_listing_returns_sorted_files_only() {
    let dir = std::env::temp_dir().join(format!(
        "layermerge_listing_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(dir.join("sub.png")).unwrap();
    std::fs::write(dir.join("b.png"), b"x").unwrap();
    std::fs::write(dir.join("a.png"), b"x").unwrap();

    let names = read_listing(&dir).unwrap();
    assert_eq!(names, vec!["a.png".to_string(), "b.png".to_string()]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn read_listing_missing_dir_is_io_error() {
    let err = read_listing(std::path::Path::new("/definitely/not/here")).unwrap_err();
    assert!(matches!(err, MergeError::Io { .. }));
}
