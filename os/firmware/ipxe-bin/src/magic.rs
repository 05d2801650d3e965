/// Placeholder embedded in the startup script of every iPXE loader.
///
/// Two comment lines of 64 hex digits each, joined by a single `\n`. The
/// exact bytes are baked into the loaders when iPXE is built with
/// `EMBED=embed.ipxe`, so this value must never change independently of the
/// firmware images.
pub const MAGIC_STRING: &[u8] = b"#a8b7e61f1075c37a793f2f92cee89f7bba00c4a8d7842ce3d40b5889032d8881
#ddd16a4fc4926ecefdfb6941e33c44ed3647133638f5e84021ea44d3152e7f97";
