//! Fixed texts the assistant speaks with: persona, price list, contacts,
//! the seeded greeting and the fallback apology.

/// Bot message every transcript starts with (and returns to on reset).
pub const GREETING: &str = "Xin chào! Tôi là chatbot tư vấn thiệp cưới ONLINE. Tôi có thể giúp bạn tìm hiểu về các gói dịch vụ thiệp cưới của chúng tôi. Bạn có câu hỏi gì không?";

/// Bot message used when the provider answers 2xx without usable text.
pub const FALLBACK_REPLY: &str = "Xin lỗi, tôi không thể trả lời lúc này.";

const PERSONA: &str = "Bạn là chatbot tư vấn thiệp cưới ONLINE.";

/// Service packages offered, in price order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingTier {
    Basic,
    Pro,
    Vip,
    Svip,
}

impl PricingTier {
    pub fn all() -> [PricingTier; 4] {
        [
            PricingTier::Basic,
            PricingTier::Pro,
            PricingTier::Vip,
            PricingTier::Svip,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PricingTier::Basic => "Gói thường",
            PricingTier::Pro => "Pro",
            PricingTier::Vip => "VIP",
            PricingTier::Svip => "SVIP",
        }
    }

    /// Price in thousands of VND
    pub fn price_k(&self) -> u32 {
        match self {
            PricingTier::Basic => 169,
            PricingTier::Pro => 289,
            PricingTier::Vip => 510,
            PricingTier::Svip => 730,
        }
    }
}

/// Where customers go to place an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactChannel {
    Zalo,
    Website,
}

impl ContactChannel {
    pub fn all() -> [ContactChannel; 2] {
        [ContactChannel::Zalo, ContactChannel::Website]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContactChannel::Zalo => "Zalo",
            ContactChannel::Website => "Website",
        }
    }

    pub fn value(&self) -> &'static str {
        match self {
            ContactChannel::Zalo => "0967021887",
            ContactChannel::Website => "https://thiepcuoi.pudfoods.com",
        }
    }
}

/// Build the system instruction sent with every request.
pub fn system_prompt() -> String {
    let mut prompt = String::new();

    prompt.push_str(PERSONA);
    prompt.push_str("\n\nGói dịch vụ:\n");
    for tier in PricingTier::all() {
        prompt.push_str(&format!("- {}: {}k\n", tier.display_name(), tier.price_k()));
    }

    prompt.push_str("\nNếu khách hàng cần đặt thiệp, liên hệ:");
    for channel in ContactChannel::all() {
        prompt.push_str(&format!("\n- {}: {}", channel.label(), channel.value()));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_matches_published_price_list() {
        let expected = "Bạn là chatbot tư vấn thiệp cưới ONLINE.\n\
\n\
Gói dịch vụ:\n\
- Gói thường: 169k\n\
- Pro: 289k\n\
- VIP: 510k\n\
- SVIP: 730k\n\
\n\
Nếu khách hàng cần đặt thiệp, liên hệ:\n\
- Zalo: 0967021887\n\
- Website: https://thiepcuoi.pudfoods.com";
        assert_eq!(system_prompt(), expected);
    }

    #[test]
    fn tiers_are_in_ascending_price_order() {
        let prices: Vec<u32> = PricingTier::all().iter().map(|t| t.price_k()).collect();
        let mut sorted = prices.clone();
        sorted.sort();
        assert_eq!(prices, sorted);
    }
}
