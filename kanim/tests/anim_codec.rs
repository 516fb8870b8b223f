//! ANIM round trips through the public API

mod common;

use kanim::anim::facing;
use kanim::{Affine, AnimElement, AnimFrame, Animation, Bank, CodecConfig, decode_anim};

fn walk_bank() -> Bank {
    let mut bank = Bank::new("wilson");
    for name in ["walk_side", "walk_up", "walk_down", "idle"] {
        let mut animation = Animation::new(name, 30.0);
        for idx in 0..4 {
            let mut frame = AnimFrame::new(idx);
            frame.x = -40.0;
            frame.y = -180.0;
            frame.w = 80.0;
            frame.h = 180.0;
            for (z, symbol) in ["leg", "torso", "arm_lower", "head"].iter().enumerate() {
                frame.push_element(AnimElement {
                    z_index: z as u32,
                    symbol: symbol.to_string(),
                    frame: idx,
                    layer_name: symbol.to_string(),
                    matrix: Affine::translation(idx as f32 * 2.0, z as f32 * -10.0),
                });
            }
            if idx == 2 {
                frame.events.push("footstep".to_string());
            }
            animation.push_frame(frame);
        }
        bank.animations.push(animation);
    }
    bank
}

#[test]
fn test_round_trip_with_configured_depth() {
    common::init_tracing();
    let config = CodecConfig::from_toml_str("[anim]\nexport_depth = 2.5").expect("config");
    let banks = vec![walk_bank(), Bank::new("empty_bank")];

    let bytes = kanim::encode_anim_with(&banks, &config.anim).expect("encode");
    let decoded = decode_anim(&bytes).expect("decode");

    // A bank without animations has nothing on the wire to carry it
    assert_eq!(decoded, vec![walk_bank()]);
}

#[test]
fn test_facing_masks_on_the_wire() {
    let bank = walk_bank();
    let masks: Vec<(String, u8)> = bank
        .animations
        .iter()
        .map(|a| (a.base_name().to_string(), a.facing()))
        .collect();
    assert_eq!(
        masks,
        vec![
            ("walk".to_string(), facing::LEFT | facing::RIGHT),
            ("walk".to_string(), facing::UP),
            ("walk".to_string(), facing::DOWN),
            ("idle".to_string(), facing::ALL),
        ]
    );
}

#[test]
fn test_model_serializes_to_json() {
    let bank = walk_bank();
    let json = serde_json::to_string(&bank).expect("serialize");
    let back: Bank = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, bank);
}
