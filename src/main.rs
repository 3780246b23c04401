use poke::error::AppResult;

fn main() -> AppResult<()> {
    poke::entry::run()
}
