/// Historical notes shown under the world map, keyed by exact year
const ANNOTATIONS: &[(&str, &str)] = &[
    ("1961", "Post-colonial independence movements in Africa and Asia drove urban migration as new governments invested in cities."),
    ("1973", "The global oil crisis disrupted economies, especially in developing nations, slowing urban development and investment."),
    ("1975", "The Khmer Rouge seized control of Cambodia, leading to a genocide that killed an estimated 1.7 million people. Cities were emptied as people were forced into rural labor camps."),
    ("1978", "China began its economic reforms and 'Open Door Policy', accelerating urbanization through rapid industrial development and rural-to-urban migration."),
    ("1980", "Structural Adjustment Programs from the IMF and World Bank led to austerity measures in Latin America and Africa, reducing urban infrastructure growth."),
    ("1989", "The fall of the Berlin Wall marked a shift in Eastern Europe, leading to economic restructuring and significant rural depopulation in favor of urban centers."),
    ("1991", "The fall of the Soviet Union caused major shifts in Eastern Europe and Central Asia. Urban areas declined due to economic collapse and industrial slowdown."),
    ("1992", "Following the breakup of Yugoslavia, the Bosnian War began. The Siege of Sarajevo and ethnic cleansing campaigns led to mass displacement and long-term urban decline."),
    ("1994", "The Rwandan Genocide and regional conflict led to massive rural displacement, altering urban growth in Central Africa. South Africa held its first democratic election, initiating post-apartheid policies that affected urban migration and access to city infrastructure."),
    ("1997", "The Asian Financial Crisis hit many Southeast Asian countries, slowing urban investment and halting infrastructure growth in cities like Jakarta, Bangkok, and Manila."),
    ("1998", "A downward trend in Kazakhstan due to an unfair presidential campaign and persecution of the opposition. The country also faced challenges related to human rights, including discrimination in favor of ethnic Kazakhs and limitations on worker rights."),
    ("2001", "9/11 caused a short-term freeze in global economic activity and urban investment, especially in the U.S. and Western Europe. China joined the World Trade Organization (WTO), boosting urban export hubs and accelerating migration into industrial cities like Shenzhen and Guangzhou."),
    ("2003", "The conflict in Darfur, Sudan escalated into a genocide, with large-scale displacement from rural areas and overburdening of urban centers like Nyala and Khartoum."),
    ("2008", "The global financial crisis halted many urban development projects, particularly in emerging economies like Brazil, India, and parts of Eastern Europe. Housing and development slumped in urban areas across the U.S. and Spain."),
    ("2010", "The Haiti earthquake devastated Port-au-Prince, causing massive urban displacement and long-term impact on city growth."),
    ("2011", "The Arab Spring sparked conflicts in Syria, Libya, and beyond, reversing urban growth in several Middle Eastern and North African countries."),
    ("2015", "Refugee influxes into European and Middle Eastern cities due to conflicts in Syria and Afghanistan spurred rapid urban demographic shifts. Cities like Berlin and Athens faced intense infrastructure strain."),
    ("2017", "The Myanmar military's persecution of the Rohingya led to over 700,000 refugees fleeing to Bangladesh. Northern Myanmar's urban population was severely affected by the loss of an entire ethnic group."),
    ("2020", "COVID-19 disrupted urban life worldwide. Migration to cities slowed due to lockdowns, economic uncertainty, and rising remote work trends. Some urban residents relocated to rural areas."),
    ("2022", "Russia's invasion of Ukraine reversed urbanization trends as war damaged infrastructure and displaced millions from cities."),
    ("2023", "Post-COVID recovery resumed in many cities, but urban growth was uneven due to inflation, climate impacts, and geopolitical tensions."),
];

/// Note for exactly `year`, or empty text
pub fn annotation_for(year: &str) -> &'static str {
    ANNOTATIONS
        .iter()
        .find(|(y, _)| *y == year)
        .map_or("", |&(_, text)| text)
}
