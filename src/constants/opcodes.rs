/// Dalvik opcode mnemonics the extractor and tests refer to by name
pub mod opcodes {
    pub const NOP: &str = "nop";
    pub const MOVE_RESULT: &str = "move-result";
    pub const MOVE_RESULT_OBJECT: &str = "move-result-object";
    pub const RETURN_VOID: &str = "return-void";
    pub const RETURN: &str = "return";
    pub const RETURN_OBJECT: &str = "return-object";
    pub const CONST: &str = "const";
    pub const CONST_4: &str = "const/4";
    pub const CONST_16: &str = "const/16";
    pub const CONST_WIDE: &str = "const-wide";
    pub const CONST_STRING: &str = "const-string";
    pub const IF_EQZ: &str = "if-eqz";
    pub const IF_NEZ: &str = "if-nez";
    pub const IGET: &str = "iget";
    pub const IGET_OBJECT: &str = "iget-object";
    pub const IPUT: &str = "iput";
    pub const SGET_OBJECT: &str = "sget-object";
    pub const INVOKE_VIRTUAL: &str = "invoke-virtual";
    pub const INVOKE_SUPER: &str = "invoke-super";
    pub const INVOKE_DIRECT: &str = "invoke-direct";
    pub const INVOKE_STATIC: &str = "invoke-static";
    pub const INVOKE_INTERFACE: &str = "invoke-interface";
    pub const ADD_INT_LIT8: &str = "add-int/lit8";
}

/// DSL identifier for a mnemonic: `invoke-virtual/range` becomes
/// `INVOKE_VIRTUAL_RANGE`
///
/// Returns `None` when the mnemonic cannot form an identifier.
pub fn dsl_name(mnemonic: &str) -> Option<String> {
    let name: String = mnemonic
        .chars()
        .map(|c| match c {
            '-' | '/' | '.' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect();

    let mut chars = name.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dsl_name() {
        assert_eq!(dsl_name(opcodes::INVOKE_VIRTUAL).as_deref(), Some("INVOKE_VIRTUAL"));
        assert_eq!(dsl_name(opcodes::CONST_4).as_deref(), Some("CONST_4"));
        assert_eq!(dsl_name("invoke-virtual/range").as_deref(), Some("INVOKE_VIRTUAL_RANGE"));
        assert_eq!(dsl_name(""), None);
        assert_eq!(dsl_name("4const"), None);
        assert_eq!(dsl_name("move result"), None);
    }
}
