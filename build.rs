use std::error::Error;
use vergen_gitcl::{Emitter, GitclBuilder};

// `ernest info` prints the commit the binary was built from.
fn main() -> Result<(), Box<dyn Error>> {
    let git = GitclBuilder::default().sha(true).dirty(true).build()?;
    Emitter::default().add_instructions(&git)?.emit()?;
    Ok(())
}
