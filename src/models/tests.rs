//! Tests for the data models

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_method_id_parts() {
        let id = MethodId::from("Lcom/example/Foo;->bar(ILjava/lang/String;)V");
        assert_eq!(id.defining_class(), Some("Lcom/example/Foo;"));
        assert_eq!(id.short_id(), "bar(ILjava/lang/String;)V");

        let bare = MethodId::from("bar()V");
        assert_eq!(bare.defining_class(), None);
        assert_eq!(bare.short_id(), "bar()V");
    }

    #[test]
    fn test_member_from_json() {
        let json = r#"[
            {"kind": "method", "id": "La;->m()I", "access_flags": 1, "return_type": "I",
             "instructions": [{"opcode": "const-string", "string": "hello"}, {"opcode": "return"}]},
            {"kind": "field", "id": "La;->f:I", "field_type": "I"},
            {"kind": "class", "id": "La;"}
        ]"#;

        let members: Vec<Member> = serde_json::from_str(json).unwrap();
        assert_eq!(members.len(), 3);
        assert_eq!(members[0].kind_name(), "method");
        assert_eq!(members[1].kind_name(), "field");
        assert_eq!(members[2].kind_name(), "class");
        assert_eq!(members[2].id(), "La;");

        match &members[0] {
            Member::Method(method) => {
                assert_eq!(method.return_type, "I");
                assert!(method.parameters.is_empty());
                assert_eq!(method.instructions[0], Instruction::const_string("hello"));
                assert_eq!(method.instructions[1], Instruction::new("return"));
            }
            other => panic!("expected a method, got {:?}", other),
        }
    }

    #[test]
    fn test_feature_kind_follows_variant() {
        assert_eq!(Feature::AccessFlags(1).kind(), FeatureKind::AccessFlags);
        assert_eq!(Feature::Literal(-1).kind(), FeatureKind::Literal);
        let opcode = Feature::OpcodeAt { index: 2, opcode: "return-void".to_string() };
        assert_eq!(opcode.kind(), FeatureKind::OpcodeAt);
        assert_eq!(opcode.to_string(), "opcode[2]:return-void");
        assert!(Feature::AccessFlags(0xffff) < Feature::ReturnType("V".to_string()));
    }

    #[test]
    fn test_feature_serde_shape() {
        let feature = Feature::StringLiteral("a".to_string());
        let json = serde_json::to_value(&feature).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "string_literal", "value": "a"}));

        let back: Feature = serde_json::from_value(json).unwrap();
        assert_eq!(back, feature);
    }
}
