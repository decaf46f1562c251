/// Dalvik access flag bit values as used on `method_id_item` entries
pub mod access_flags {
    pub const PUBLIC: u32 = 0x1;                    // Visible everywhere
    pub const PRIVATE: u32 = 0x2;                   // Visible only to the defining class
    pub const PROTECTED: u32 = 0x4;                 // Visible to package and subclasses
    pub const STATIC: u32 = 0x8;                    // No `this` argument
    pub const FINAL: u32 = 0x10;                    // Not overridable
    pub const SYNCHRONIZED: u32 = 0x20;             // Lock acquired around the call
    pub const BRIDGE: u32 = 0x40;                   // Compiler-generated bridge
    pub const VARARGS: u32 = 0x80;                  // Last argument is a rest argument
    pub const NATIVE: u32 = 0x100;                  // Implemented in native code
    pub const INTERFACE: u32 = 0x200;               // Only meaningful on classes
    pub const ABSTRACT: u32 = 0x400;                // No implementation
    pub const STRICTFP: u32 = 0x800;                // Strict floating point
    pub const SYNTHETIC: u32 = 0x1000;              // Not present in source
    pub const ANNOTATION: u32 = 0x2000;             // Only meaningful on classes
    pub const ENUM: u32 = 0x4000;                   // Only meaningful on classes and fields
    pub const CONSTRUCTOR: u32 = 0x10000;           // `<init>` or `<clinit>`
    pub const DECLARED_SYNCHRONIZED: u32 = 0x20000; // Declared `synchronized`
}

/// Flag names as they appear in the fingerprint DSL, in rendering order
pub const FLAG_NAMES: &[(u32, &str)] = &[
    (access_flags::PUBLIC, "PUBLIC"),
    (access_flags::PRIVATE, "PRIVATE"),
    (access_flags::PROTECTED, "PROTECTED"),
    (access_flags::STATIC, "STATIC"),
    (access_flags::FINAL, "FINAL"),
    (access_flags::SYNCHRONIZED, "SYNCHRONIZED"),
    (access_flags::BRIDGE, "BRIDGE"),
    (access_flags::VARARGS, "VARARGS"),
    (access_flags::NATIVE, "NATIVE"),
    (access_flags::INTERFACE, "INTERFACE"),
    (access_flags::ABSTRACT, "ABSTRACT"),
    (access_flags::STRICTFP, "STRICTFP"),
    (access_flags::SYNTHETIC, "SYNTHETIC"),
    (access_flags::ANNOTATION, "ANNOTATION"),
    (access_flags::ENUM, "ENUM"),
    (access_flags::CONSTRUCTOR, "CONSTRUCTOR"),
    (access_flags::DECLARED_SYNCHRONIZED, "DECLARED_SYNCHRONIZED"),
];

/// Every bit that has a DSL name
pub const KNOWN_FLAGS: u32 = {
    let mut mask = 0;
    let mut i = 0;
    while i < FLAG_NAMES.len() {
        mask |= FLAG_NAMES[i].0;
        i += 1;
    }
    mask
};
