/// A whole-program pass that owns its working arena while it runs.
pub trait CompilerPass {
    type Out;
    type Error;
    fn run(self) -> Result<Self::Out, Self::Error>;
}
