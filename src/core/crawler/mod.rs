mod crawler;

pub use crawler::Crawler;

#[cfg(test)]
mod tests;
