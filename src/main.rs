use chef_load::error::AppResult;

fn main() -> AppResult<()> {
    chef_load::entry::run()
}
