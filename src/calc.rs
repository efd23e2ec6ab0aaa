use crate::model::PartyType;

pub const SLICES_PER_PERSON: f64 = 2.5;
pub const SLICES_PER_PIZZA: f64 = 8.0;
const GLASSES_PER_WINE_BOTTLE: f64 = 5.0;

pub fn pizzas_needed(guests: u32) -> u32 {
    pizzas_for(guests, SLICES_PER_PERSON, SLICES_PER_PIZZA)
}

pub fn pizzas_for(guests: u32, slices_per_person: f64, slices_per_pizza: f64) -> u32 {
    if guests == 0 || slices_per_pizza <= 0.0 {
        return 0;
    }
    ceil_count(f64::from(guests) * slices_per_person / slices_per_pizza)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BeverageRequest {
    pub guests: u32,
    pub hours: u32,
    pub party_type: PartyType,
    pub include_alcohol: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BeverageEstimate {
    pub water_bottles: u32,
    pub soft_drinks: u32,
    pub beer_bottles: u32,
    pub wine_bottles: u32,
    pub cocktail_servings: u32,
}

impl BeverageEstimate {
    pub fn total_items(&self) -> u32 {
        self.water_bottles
            + self.soft_drinks
            + self.beer_bottles
            + self.wine_bottles
            + self.cocktail_servings
    }
}

/// Drinks per guest per hour.
pub fn drink_rate(party_type: PartyType) -> f64 {
    match party_type {
        PartyType::Formal => 1.0,
        PartyType::Casual | PartyType::Mixed => 1.5,
    }
}

/// Share of drinks that are alcoholic when alcohol is served.
pub fn alcohol_share(party_type: PartyType) -> f64 {
    match party_type {
        PartyType::Formal => 0.6,
        PartyType::Casual | PartyType::Mixed => 0.7,
    }
}

pub fn beverages(request: BeverageRequest) -> BeverageEstimate {
    if request.guests == 0 {
        return BeverageEstimate::default();
    }
    let guests = f64::from(request.guests);
    let total = guests * f64::from(request.hours) * drink_rate(request.party_type);

    if !request.include_alcohol {
        return BeverageEstimate {
            water_bottles: ceil_count(guests * 2.0),
            soft_drinks: ceil_count(total * 0.8),
            ..BeverageEstimate::default()
        };
    }

    let share = alcohol_share(request.party_type);
    let alcoholic = total * share;
    let non_alcoholic = total * (1.0 - share);
    BeverageEstimate {
        water_bottles: ceil_count(guests * 1.5),
        soft_drinks: ceil_count(non_alcoholic * 0.7),
        beer_bottles: ceil_count(alcoholic * 0.5),
        wine_bottles: ceil_count(alcoholic * 0.3 / GLASSES_PER_WINE_BOTTLE),
        cocktail_servings: ceil_count(alcoholic * 0.2),
    }
}

fn ceil_count(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else {
        value.ceil() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_guests_need_seven_pizzas() {
        assert_eq!(pizzas_needed(20), 7);
        assert_eq!(pizzas_needed(16), 5);
        assert_eq!(pizzas_needed(1), 1);
        assert_eq!(pizzas_needed(0), 0);
    }

    #[test]
    fn custom_slice_counts() {
        assert_eq!(pizzas_for(12, 3.0, 6.0), 6);
        assert_eq!(pizzas_for(12, 3.0, 0.0), 0);
    }

    #[test]
    fn beverages_without_alcohol() {
        let estimate = beverages(BeverageRequest {
            guests: 10,
            hours: 3,
            party_type: PartyType::Casual,
            include_alcohol: false,
        });
        // 10 guests * 3 h * 1.5 = 45 drinks
        assert_eq!(
            estimate,
            BeverageEstimate {
                water_bottles: 20,
                soft_drinks: 36,
                ..BeverageEstimate::default()
            }
        );
    }

    #[test]
    fn formal_party_with_alcohol() {
        let estimate = beverages(BeverageRequest {
            guests: 20,
            hours: 4,
            party_type: PartyType::Formal,
            include_alcohol: true,
        });
        // 80 drinks, 48 alcoholic, 32 not
        assert_eq!(estimate.water_bottles, 30);
        assert_eq!(estimate.soft_drinks, 23);
        assert_eq!(estimate.beer_bottles, 24);
        assert_eq!(estimate.wine_bottles, 3);
        assert_eq!(estimate.cocktail_servings, 10);
        assert_eq!(estimate.total_items(), 90);
    }

    #[test]
    fn no_guests_means_no_drinks() {
        let estimate = beverages(BeverageRequest {
            guests: 0,
            hours: 5,
            party_type: PartyType::Mixed,
            include_alcohol: true,
        });
        assert_eq!(estimate, BeverageEstimate::default());
    }
}
