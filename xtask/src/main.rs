/// The xtask binary delegates entirely to nih_plug_xtask, which provides
/// the `bundle` subcommand. Usage:
///
///   cargo xtask bundle dr-echo --release
///
/// This compiles the plugin as a cdylib and packages it into
/// `target/bundled/Dr Echo.clap` and `target/bundled/Dr Echo.vst3`.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
