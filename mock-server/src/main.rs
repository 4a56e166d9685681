use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("entity server listening on {addr}");

    // MOCK_USER/MOCK_PASSWORD switch the server into credential-checking
    // mode; without them any X-User/X-Password pair is accepted.
    match (std::env::var("MOCK_USER"), std::env::var("MOCK_PASSWORD")) {
        (Ok(username), Ok(password)) => {
            mock_server::run_with_credentials(listener, &username, &password).await
        }
        _ => mock_server::run(listener).await,
    }
}
