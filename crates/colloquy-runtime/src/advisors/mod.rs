//! Built-in domain advisors registered with the dialogue engine.

mod product;
mod sports;

pub use product::ProductAdvisor;
pub use sports::SportsAdvisor;

use colloquy_core::models::{EntityMap, EntityType};

fn first<'a>(entities: &'a EntityMap, entity: EntityType) -> Option<&'a str> {
    entities
        .get(&entity)
        .and_then(|values| values.first())
        .map(String::as_str)
}
