// generate_key.rs
// Prints a fresh SESSION_SECRET: the AES-256 key that seals the `user_session`
// cookie. The auth and app servers must run with the same value.

#[allow(dead_code)]
#[path = "services/encryption.rs"]
mod encryption;

use encryption::SessionCipher;

fn main() {
    println!("Generating new AES-256 key for the user_session cookie...\n");

    let key = SessionCipher::generate_key();

    println!("✅ Key generated successfully!\n");
    println!("Add this to the .env of both the auth server and the app server:");
    println!("─────────────────────────────────────────────────");
    println!("SESSION_SECRET={}", key);
    println!("─────────────────────────────────────────────────");
    println!("\n⚠️  IMPORTANT:");
    println!("  • Keep this key secure and never commit it to version control");
    println!("  • The app server rejects sessions sealed under a different key");
    println!("  • Rotating the key signs every user out");
}
