use super::*;
use crate::settings::model::{AlphaSettings, RegionMaskSettings};

fn layer(name: &str) -> SourceImageSettings {
    SourceImageSettings {
        file_name: name.to_string(),
        ..Default::default()
    }
}

#[test]
fn compile_defaults_to_no_effects() {
    let spec = LayerSpec::compile(4, &layer("a.png")).unwrap();
    assert_eq!(spec.index, 4);
    assert_eq!(spec.pattern, "a.png");
    assert_eq!(spec.offset, Offset::default());
    assert!(spec.alpha.is_none());
    assert!(spec.shadow.is_none());
    assert!(spec.mask_rules.is_empty());
}

#[test]
fn compile_decodes_every_color() {
    let src = SourceImageSettings {
        position: Some([5, -7]),
        alpha: Some(AlphaSettings {
            value: 0.25,
            ignore_list: vec!["#112233".into()],
            exclude_mask: true,
        }),
        is_shadow: true,
        shadow_color: Some("0x445566".into()),
        region_mask: Some(vec![RegionMaskSettings {
            target_color: "#FF0000".into(),
            margin: 3,
        }]),
        ..layer("b.png")
    };
    let spec = LayerSpec::compile(0, &src).unwrap();
    assert_eq!(spec.offset, Offset { x: 5, y: -7 });
    let alpha = spec.alpha.unwrap();
    assert_eq!(alpha.value, 0.25);
    assert!(alpha.ignores(Rgba8::new(0x11, 0x22, 0x33, 0)));
    assert!(alpha.exclude_mask);
    assert!(spec.shadow.whole_layer);
    assert_eq!(spec.shadow.trigger, Some(Rgba8::opaque(0x44, 0x55, 0x66)));
    assert_eq!(
        spec.mask_rules,
        vec![MaskRule {
            target: Rgba8::opaque(255, 0, 0),
            margin: 3
        }]
    );
}

#[test]
fn compile_reports_the_failing_field() {
    let src = SourceImageSettings {
        shadow_color: Some("#12".into()),
        ..layer("c.png")
    };
    match LayerSpec::compile(2, &src).unwrap_err() {
        crate::MergeError::ColorFormat { field, input } => {
            assert_eq!(field, "sourceImages[2].shadowColor");
            assert_eq!(input, "#12");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn shadow_policy_matches_layer_flag_or_trigger() {
    let whole = ShadowPolicy {
        whole_layer: true,
        trigger: None,
    };
    assert!(whole.applies_to(Rgba8::opaque(1, 2, 3)));
    assert!(!whole.applies_to(Rgba8::WHITE));

    let trigger = ShadowPolicy {
        whole_layer: false,
        trigger: Some(Rgba8::opaque(9, 9, 9)),
    };
    assert!(trigger.applies_to(Rgba8::new(9, 9, 9, 0)));
    assert!(!trigger.applies_to(Rgba8::opaque(1, 2, 3)));
}

#[test]
fn replacements_skip_bad_rules_and_keep_order() {
    let rules = compile_replacements(&[
        ColorReplacementSettings {
            from: "#000001".into(),
            to: "#000002".into(),
        },
        ColorReplacementSettings {
            from: "bad".into(),
            to: "#000003".into(),
        },
        ColorReplacementSettings {
            from: "#000002".into(),
            to: "#000004".into(),
        },
    ]);
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[1].from, Rgba8::opaque(0, 0, 2));
}

#[test]
fn earlier_rule_recolors_before_later_ones_match() {
    let red = Rgba8::opaque(255, 0, 0);
    let green = Rgba8::opaque(0, 255, 0);
    let blue = Rgba8::opaque(0, 0, 255);
    let rules = [
        ColorReplacementRule {
            from: red,
            to: green,
        },
        ColorReplacementRule {
            from: red,
            to: blue,
        },
    ];
    // The first rule already turned red into green, so the second never matches.
    assert_eq!(apply_replacements(&rules, red), green);
    assert_eq!(apply_replacements(&rules, Rgba8::WHITE), Rgba8::WHITE);
}

#[test]
fn replacements_chain_in_list_order() {
    let red = Rgba8::opaque(255, 0, 0);
    let green = Rgba8::opaque(0, 255, 0);
    let blue = Rgba8::opaque(0, 0, 255);
    let rules = [
        ColorReplacementRule {
            from: red,
            to: green,
        },
        ColorReplacementRule {
            from: green,
            to: blue,
        },
    ];
    assert_eq!(apply_replacements(&rules, red), blue);
    assert_eq!(apply_replacements(&rules, green), blue);
    assert_eq!(apply_replacements(&rules, blue), blue);

    let reversed = [rules[1], rules[0]];
    assert_eq!(apply_replacements(&reversed, red), green);
}

#[test]
fn compile_layers_keeps_failures_per_layer() {
    let settings = MergeSettings {
        output_file_name: "o.png".into(),
        source_images: vec![
            layer("a.png"),
            SourceImageSettings {
                shadow_color: Some("nope".into()),
                ..layer("b.png")
            },
        ],
        ..Default::default()
    };
    let compiled = compile_layers(&settings);
    assert!(compiled[0].is_ok());
    assert!(compiled[1].is_err());
}
