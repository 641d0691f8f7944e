use dotenvy::dotenv;
use storefront_checkout::domain::ports::CartApi;
use storefront_checkout::notify::LogNotifier;
use storefront_checkout::{build_client, CartPage, CheckoutPage, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env()?;
    let client = build_client(&config)?;
    log::info!("Using storefront API at {}", client.base_url());

    let page = std::env::args().nth(1).unwrap_or_else(|| "cart".to_string());
    match page.as_str() {
        "cart" => {
            let cart = CartPage::load(client, LogNotifier).await;
            print!("{}", cart.render());
        }
        "checkout" => {
            let cart_id = match std::env::args().nth(2) {
                Some(id) => id,
                None => client.current_cart().await?.cart_id,
            };
            let checkout = CheckoutPage::load(client, LogNotifier, &cart_id, config.shipping).await;
            print!("{}", checkout.render());
        }
        other => {
            log::error!("Unknown page '{}', expected 'cart' or 'checkout'", other);
            std::process::exit(2);
        }
    }
    Ok(())
}
