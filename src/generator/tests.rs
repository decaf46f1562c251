//! Tests for fingerprint rendering and report output

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::constants::access_flags::access_flags::{CONSTRUCTOR, FINAL, PUBLIC, STATIC};
    use crate::errors::FingerprintError;
    use crate::models::{Feature, Fingerprint, FingerprintReport, MethodId, RenderedSet, Strategy};

    fn opcode(index: usize, name: &str) -> Feature {
        Feature::OpcodeAt { index, opcode: name.to_string() }
    }

    #[test]
    fn test_render_full_vocabulary() {
        let features = vec![
            Feature::AccessFlags(PUBLIC | STATIC | FINAL),
            Feature::ReturnType("Ljava/lang/String;".to_string()),
            Feature::Parameters(vec!["I".to_string(), "Z".to_string()]),
            Feature::StringLiteral("first".to_string()),
            Feature::StringLiteral("second".to_string()),
            Feature::InvokedMethod("Landroid/util/Log;->d(Ljava/lang/String;Ljava/lang/String;)I".to_string()),
            Feature::Literal(-7),
            Feature::Literal(4096),
            opcode(0, "const-string"),
            opcode(2, "invoke-static"),
        ];

        let rendered = render(&features).unwrap();
        let expected = "fingerprint {\n\
            \x20   accessFlags(AccessFlags.PUBLIC, AccessFlags.STATIC, AccessFlags.FINAL)\n\
            \x20   returns(\"Ljava/lang/String;\")\n\
            \x20   parameters(\"I\", \"Z\")\n\
            \x20   strings(\"first\", \"second\")\n\
            \x20   invokes(\"Landroid/util/Log;->d(Ljava/lang/String;Ljava/lang/String;)I\")\n\
            \x20   literals(-7, 4096)\n\
            \x20   opcodes(Opcode.CONST_STRING, null, Opcode.INVOKE_STATIC)\n\
            }";
        assert_eq!(rendered.as_str(), expected);
    }

    #[test]
    fn test_render_is_byte_stable() {
        let features = vec![
            Feature::StringLiteral("x".to_string()),
            Feature::AccessFlags(PUBLIC | CONSTRUCTOR),
            opcode(1, "return-void"),
        ];
        let first = render(&features).unwrap();
        for _ in 0..3 {
            assert_eq!(render(&features).unwrap(), first);
        }
        // Clause order follows the first feature of each kind
        assert!(first.as_str().find("strings").unwrap() < first.as_str().find("accessFlags").unwrap());
        assert!(first.as_str().contains("accessFlags(AccessFlags.PUBLIC, AccessFlags.CONSTRUCTOR)"));
        assert!(first.as_str().contains("opcodes(null, Opcode.RETURN_VOID)"));
    }

    #[test]
    fn test_render_groups_by_kind() {
        let features = vec![
            Feature::StringLiteral("a".to_string()),
            Feature::AccessFlags(PUBLIC),
            opcode(0, "nop"),
            Feature::StringLiteral("b".to_string()),
            opcode(3, "return-void"),
        ];
        assert_eq!(
            render(&features).unwrap().as_str(),
            "fingerprint {\n    strings(\"a\", \"b\")\n    accessFlags(AccessFlags.PUBLIC)\n    \
             opcodes(Opcode.NOP, null, null, Opcode.RETURN_VOID)\n}"
        );
    }

    #[test]
    fn test_render_empty_set() {
        assert_eq!(render(&[]).unwrap().as_str(), "fingerprint {\n}");
    }

    #[test]
    fn test_render_parameterless_method() {
        let rendered = render(&[Feature::Parameters(Vec::new())]).unwrap();
        assert_eq!(rendered.as_str(), "fingerprint {\n    parameters()\n}");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
        assert_eq!(quote("line\nbreak\ttab\r"), "\"line\\nbreak\\ttab\\r\"");
        assert_eq!(quote("${name}"), "\"\\${name}\"");
        assert_eq!(quote("bell\u{7}"), "\"bell\\u0007\"");
        assert_eq!(quote("ünïcödé"), "\"ünïcödé\"");
    }

    #[test]
    fn test_render_rejects_unknown_flag_bits() {
        let result = render(&[Feature::AccessFlags(PUBLIC | 0x8000_0000)]);
        match result {
            Err(FingerprintError::Render(message)) => assert!(message.contains("0x80000000")),
            other => panic!("expected Render error, got {:?}", other),
        }
    }

    #[test]
    fn test_render_rejects_bad_opcode() {
        assert!(matches!(render(&[opcode(0, "9lives")]), Err(FingerprintError::Render(_))));
        assert!(matches!(render(&[opcode(0, "")]), Err(FingerprintError::Render(_))));
    }

    #[test]
    fn test_render_rejects_conflicts() {
        let conflicting_opcodes = [opcode(0, "nop"), opcode(0, "return-void")];
        assert!(matches!(render(&conflicting_opcodes), Err(FingerprintError::Render(_))));

        let conflicting_returns = [
            Feature::ReturnType("V".to_string()),
            Feature::ReturnType("I".to_string()),
        ];
        assert!(matches!(render(&conflicting_returns), Err(FingerprintError::Render(_))));

        // Repeating the same feature is harmless
        let repeated = [opcode(0, "nop"), opcode(0, "nop"), Feature::Literal(1), Feature::Literal(1)];
        assert_eq!(
            render(&repeated).unwrap().as_str(),
            "fingerprint {\n    opcodes(Opcode.NOP)\n    literals(1)\n}"
        );
    }

    fn sample_report() -> FingerprintReport {
        let full = render(&[Feature::AccessFlags(PUBLIC), Feature::StringLiteral("a".to_string())]).unwrap();
        FingerprintReport {
            method: MethodId::from("LA;->m1()I"),
            corpus_id: "app-1.0".to_string(),
            corpus_digest: "00ff".to_string(),
            generation: 3,
            full_feature_count: 5,
            full_fingerprint: Fingerprint::new("fingerprint {\n}".to_string()),
            fingerprints: vec![RenderedSet {
                features: vec![Feature::AccessFlags(PUBLIC), Feature::StringLiteral("a".to_string())],
                fingerprint: full,
                strategy: Strategy::Exhaustive,
            }],
        }
    }

    #[test]
    fn test_format_text() {
        let text = format_text(&sample_report());
        assert!(text.starts_with("Found 1 fingerprint(s) for method : LA;->m1()I\n\n"));
        assert!(text.contains("Full Method Fingerprint | 5 feature(s)\nfingerprint {\n}\n"));
        assert!(text.contains("Fingerprint #1 | 2 feature(s) | Exhaustive\nfingerprint {\n"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["method"], "LA;->m1()I");
        assert_eq!(value["generation"], 3);
        assert_eq!(value["fingerprints"][0]["strategy"], "exhaustive");
        assert!(value["fingerprints"][0]["fingerprint"].as_str().unwrap().contains("strings(\"a\")"));
    }
}
