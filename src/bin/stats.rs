use kitchen::db::{ingredient, recipe, step, utensil, Db};
use kitchen::recipe::{DetailedRecipe, MAX_HOPS};
use kitchen::Config;

/// Total utensil wait of a recipe, in milliseconds
fn total_wait(recipe: &DetailedRecipe) -> i64 {
    recipe.hops().iter().map(|hop| hop.utensil.wait_time_in_millis).sum()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::load()?;
    let db = Db::new(config.db_path());

    println!("\n=== Kitchen Graph Statistics ===\n");

    let (ingredients, utensils, steps) = tokio::try_join!(
        ingredient::count(&db),
        utensil::count(&db),
        step::count(&db),
    )?;
    let recipes = recipe::get_all_detailed(&db).await?;

    println!("{:-<40}", "");
    println!("{:<20} {:>12}", "Ingredients", ingredients);
    println!("{:<20} {:>12}", "Utensils", utensils);
    println!("{:<20} {:>12}", "Steps", steps);
    println!("{:<20} {:>12}", "Recipes", recipes.len());
    println!("{:-<40}", "");

    if recipes.is_empty() {
        println!("\nNo recipes found. Add steps from start to end ingredients.");
        return Ok(());
    }

    let mut histogram = [0usize; MAX_HOPS];
    for recipe in &recipes {
        histogram[recipe.steps() - 1] += 1;
    }

    println!("\nRecipes by Length:\n");
    println!("{:<20} {:>12}", "Steps", "Recipes");
    println!("{:-<40}", "");
    for (idx, count) in histogram.iter().enumerate() {
        println!("{:<20} {:>12}", idx + 1, count);
    }
    println!("{:-<40}", "");

    if let Some(slowest) = recipes.iter().max_by_key(|r| total_wait(r)) {
        let names: Vec<&str> = std::iter::once(slowest.input().name.as_str())
            .chain(slowest.hops().iter().map(|hop| hop.ingredient.name.as_str()))
            .collect();
        println!("\nSlowest recipe ({} ms):", total_wait(slowest));
        println!("  {}", names.join(" -> "));
    }

    println!();

    Ok(())
}
