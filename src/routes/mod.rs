pub mod health;
pub mod outfits;
pub mod suggestions;
pub mod trends;
pub mod users;
pub mod wardrobe;
pub mod weather;
