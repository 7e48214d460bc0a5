// Entry point for the GitHub login demo.
//
// Configuration loading, middleware and routes are assembled by `oauth2_server::run`.
#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    oauth2_server::run().await
}
