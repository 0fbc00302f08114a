//! friscc - the compiler half of the pipeline as a single process: a
//! parse-tree dump on stdin, FRISC assembly on stdout. A semantic rule
//! violation prints its fixed diagnostic to stdout and exits 1.

use std::io::Read;

fn main() -> anyhow::Result<()> {
    let mut tree_dump = String::new();
    std::io::stdin().read_to_string(&mut tree_dump)?;

    match frisc_drv::build(&tree_dump)? {
        frisc_drv::Outcome::Accepted(asm) => {
            print!("{asm}");
            Ok(())
        }
        frisc_drv::Outcome::Rejected(diagnostic) => {
            println!("{diagnostic}");
            std::process::exit(1);
        }
    }
}
