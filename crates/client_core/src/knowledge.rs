//! Canned answers for the topic lookup step of the dispatcher.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Prevention,
    Cure,
    HealthEffects,
    Diet,
    About,
    Features,
    Pm25,
    Pm10,
    No2,
    AqiIndex,
}

impl Topic {
    /// Lookup order. When an utterance matches several topics the earliest wins.
    pub const ORDERED: [Topic; 10] = [
        Topic::Prevention,
        Topic::Cure,
        Topic::HealthEffects,
        Topic::Diet,
        Topic::About,
        Topic::Features,
        Topic::Pm25,
        Topic::Pm10,
        Topic::No2,
        Topic::AqiIndex,
    ];

    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Topic::Prevention => &["prevent", "protect", "precaution", "mask"],
            Topic::Cure => &["cure", "treat", "medicine", "remedy"],
            Topic::HealthEffects => &["health", "symptom", "effect", "harm"],
            Topic::Diet => &["food", "diet", "eat", "nutrition"],
            Topic::About => &["who are you", "what is this", "about app"],
            Topic::Features => &["feature", "what can you do", "help"],
            Topic::Pm25 => &["pm2.5", "pm 2.5"],
            Topic::Pm10 => &["pm10", "pm 10"],
            Topic::No2 => &["no2", "nitrogen"],
            Topic::AqiIndex => &["what is aqi", "index"],
        }
    }

    pub fn answer(self) -> &'static str {
        match self {
            Topic::Prevention => PREVENTION,
            Topic::Cure => CURE,
            Topic::HealthEffects => HEALTH_EFFECTS,
            Topic::Diet => DIET,
            Topic::About => ABOUT,
            Topic::Features => FEATURES,
            Topic::Pm25 => PM25,
            Topic::Pm10 => PM10,
            Topic::No2 => NO2,
            Topic::AqiIndex => AQI_INDEX,
        }
    }
}

const PREVENTION: &str = "**Prevention is better than cure! Here are effective ways to protect yourself:**
1. **Mask Up**: Use N95 or N99 masks when outdoors. Cloth masks are ineffective against PM2.5.
2. **Air Purifiers**: Use HEPA filter air purifiers indoors, especially in bedrooms.
3. **Seal Leaks**: Ensure windows and doors are sealed to prevent outdoor air infiltration.
4. **Hydration**: Drink plenty of water to help your body flush out toxins.
5. **Indoor Plants**: Keep plants like Snake Plant, Areca Palm, and Spider Plant to naturally purify air.";

const CURE: &str = "**While there is no instant \"cure\" for pollution exposure, you can alleviate symptoms:**
1. **Steam Inhalation**: Helps clear airways and remove particulate matter from nasal passages.
2. **Jaggery (Gur)**: Consuming jaggery helps flush out pollutants from the lungs.
3. **Antioxidant Diet**: Eat foods rich in Vitamin C (Citrus fruits) and Vitamin E (Nuts) to combat oxidative stress.
4. **Breathing Exercises**: Pranayama and deep breathing (indoors) can strengthen lung capacity.
*Note: If you experience severe difficulty breathing or chest pain, seek medical attention immediately.*";

const HEALTH_EFFECTS: &str = "**Air pollution can seriously impact your health. Watch out for:**
1. **Short-term**: Coughing, eye irritation, headache, and shortness of breath.
2. **Long-term**: Asthma, bronchitis, heart disease, and reduced lung function.
3. **Vulnerable Groups**: Children, the elderly, and those with respiratory issues should stay indoors when AQI is > 200.";

const DIET: &str = "**Diet to fight pollution:**
1. **Turmeric & Ginger**: Natural anti-inflammatory properties.
2. **Tulsi Tea**: Clears respiratory tract.
3. **Broccoli & Spinach**: Rich in antioxidants.";

const ABOUT: &str = "**I am AirGuard, your pollution assistant.**
My mission is to help you breathe cleaner air. I can track real-time AQI, predict future pollution, guide you to cleaner routes, and even help you during asthma emergencies.";

const FEATURES: &str = "**Here is what I can do for you:**
1. **Real-time Monitoring**: Check AQI for any city in the world.
2. **Health Protection**: Give personalized advice based on pollution levels.
3. **Emergency Protocol**: Guide you through asthma attacks.
4. **Route Planning**: Find the cleanest path to your destination.
5. **Voice Assistance**: Just talk to me, and I'll answer!";

const PM25: &str = "**PM2.5 (Particulate Matter 2.5)** are tiny particles less than 2.5 micrometers in diameter (30x smaller than hair).
*   **Source**: Vehicle exhaust, burning trash, industrial smoke.
*   **Danger**: They can penetrate deep into the lungs and enter the bloodstream, causing heart and lung disease.";

const PM10: &str = "**PM10** are larger particles (dust, pollen, mold).
*   **Source**: Construction dust, road dust, windblown soil.
*   **Danger**: They irritate the eyes, nose, and throat but usually don't enter the bloodstream like PM2.5.";

const NO2: &str = "**NO2 (Nitrogen Dioxide)** is a reddish-brown gas with a sharp smell.
*   **Source**: Burning fuel (cars, trucks, power plants).
*   **Danger**: Irritates airways and aggravates asthma.";

const AQI_INDEX: &str = "**AQI (Air Quality Index)** is a number used to report daily air quality.
*   **0-50**: Good (Green)
*   **51-100**: Moderate (Yellow)
*   **101-150**: Unhealthy for Sensitive Groups (Orange)
*   **151-200**: Unhealthy (Red)
*   **201-300**: Very Unhealthy (Purple)
*   **301+**: Hazardous (Maroon)";
