//! Chat commands for managing brain categories.
//!
//! All are respond-mode:
//!
//! | command                  | effect                              |
//! |--------------------------|-------------------------------------|
//! | `categories`             | list category names                 |
//! | `list <category>`        | list items with their indices       |
//! | `add <category> <item>`  | append an item                      |
//! | `remove <category> <n>`  | remove the item at index `n`        |
//! | `random <category>`      | pick a random item                  |

use nurph_brain::Error as BrainError;

use crate::{Response, Result, Robot};

/// Register the category commands on `robot`.
pub fn register(robot: &mut Robot) -> Result<()> {
    robot.respond(r"(?i)^categories\s*$", categories)?;
    robot.respond(r"(?i)^list\s+(\S+)\s*$", list)?;
    robot.respond(r"(?i)^add\s+(\S+)\s+(.+?)\s*$", add)?;
    robot.respond(r"(?i)^remove\s+(\S+)\s+(-?\d+)\s*$", remove)?;
    robot.respond(r"(?i)^random\s+(\S+)\s*$", random)?;
    Ok(())
}

fn category_arg(res: &Response) -> &str {
    res.capture(1).unwrap_or_default()
}

async fn categories(res: Response) -> anyhow::Result<()> {
    let names = res.brain().list_categories().await?;
    let text = if names.is_empty() {
        "No categories yet.".to_string()
    } else {
        names.join(", ")
    };
    res.reply(text).wait().await;
    Ok(())
}

async fn list(res: Response) -> anyhow::Result<()> {
    let category = category_arg(&res);
    let items = res.brain().list_items_in_category(category).await?;
    let text = if items.is_empty() {
        format!("{category} is empty.")
    } else {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{i}. {item}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    res.reply(text).wait().await;
    Ok(())
}

async fn add(res: Response) -> anyhow::Result<()> {
    let category = category_arg(&res);
    let item = res.capture(2).unwrap_or_default();
    res.brain().add_item_to_category(category, item).await?;
    res.reply(format!("Added to {category}.")).wait().await;
    Ok(())
}

async fn remove(res: Response) -> anyhow::Result<()> {
    let category = category_arg(&res);
    let Ok(index) = res.capture(2).unwrap_or_default().parse::<i64>() else {
        res.reply("That index is too large.").wait().await;
        return Ok(());
    };
    let text = match res
        .brain()
        .remove_item_at_index_in_category(category, index)
        .await
    {
        Ok(Some(item)) => format!("Removed {item} from {category}."),
        Ok(None) => format!("Nothing at index {index} in {category}."),
        Err(BrainError::NegativeIndex { .. }) => "Index must be zero or greater.".to_string(),
        Err(e) => return Err(e.into()),
    };
    res.reply(text).wait().await;
    Ok(())
}

async fn random(res: Response) -> anyhow::Result<()> {
    let category = category_arg(&res);
    let text = match res.brain().get_random_item_from_category(category).await? {
        Some(item) => item,
        None => format!("{category} is empty."),
    };
    res.reply(text).wait().await;
    Ok(())
}
