use crate::state::{AppState, Product};

fn detail(product: &Product) -> Vec<String> {
    vec![
        format!("Selected: {}", product.meta.name),
        format!("  Address         {}", product.address),
        format!("  Description     {}", product.meta.description),
        format!("  Image           {}", product.meta.image),
        format!("  Status          {}", product.status),
        format!("  Proposed price  {}", product.figures.proposed_price),
        format!("  Final price     {}", product.figures.final_price),
        format!("  Your price      {}", product.figures.viewer_price),
    ]
}

pub fn render_products(state: &AppState) -> String {
    let mut lines = vec![format!("Products ({})", state.products.len())];

    if !state.products.is_empty() {
        lines.push(format!(
            "   {:>3}  {:<24} {:<8} {:>14} {:>14}",
            "#", "Name", "Status", "Proposed", "Final"
        ));
        for (index, product) in state.products.iter().enumerate() {
            let marker = if index == state.current_product { "*" } else { " " };
            lines.push(format!(
                " {} {:>3}  {:<24} {:<8} {:>14} {:>14}",
                marker,
                index,
                product.meta.name,
                product.status.label(),
                product.figures.proposed_price.to_string(),
                product.figures.final_price.to_string()
            ));
        }
    }

    if let Some(product) = state.current_product() {
        lines.push(String::new());
        lines.extend(detail(product));
    }

    if state.is_admin {
        lines.push(String::new());
        lines.push("New product".to_string());
        lines.push(format!("  Name         [{}]", state.new_product.name));
        lines.push(format!("  Description  [{}]", state.new_product.description));
        lines.push(format!("  Image        [{}]", state.new_product.image));
    }

    lines.join("\n")
}
