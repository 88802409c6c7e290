use tallyd::error::AppResult;

fn main() -> AppResult<()> {
    tallyd::entry::run()
}
