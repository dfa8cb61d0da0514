use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    mycelial::cli::main()
}
