mod cloudflare;
mod fake;
