pub mod snake;
pub mod twenty48;
pub mod typing;

pub struct GameDescriptor
{
    pub name: &'static str,
    pub description: &'static str,
}

pub fn registry() -> Vec<GameDescriptor>
{
    vec![GameDescriptor {
        name: "2048",
        description: "Slide and merge tiles to reach 2048 (progress is saved)",
    },
    GameDescriptor {
        name: "snake",
        description: "Classic snake that speeds up as it eats",
    },
    GameDescriptor {
        name: "typing",
        description: "Type as many words as you can in 60 seconds",
    }]
}

/// Finds a game by registry name, ignoring case. `twenty48` is accepted as
/// an alias for `2048`.
pub fn lookup(choice: &str) -> Option<&'static str>
{
    if choice.eq_ignore_ascii_case("twenty48") {
        return Some("2048");
    }
    registry()
        .into_iter()
        .find(|game| game.name.eq_ignore_ascii_case(choice))
        .map(|game| game.name)
}
